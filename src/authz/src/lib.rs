//! # Rolegate Authorization
//!
//! Route-level role-based authorization with a `resource:role:operation`
//! role naming scheme.
//!
//! ## Features
//!
//! - **Role taxonomy** with wildcard (`*`) and "no sub-role" semantics
//! - **Weighted best-match** resolution picking the most specific role pair
//! - **Route role catalog** built once at startup, keyed by method, path and
//!   routing constraints
//! - **Async decision gate** with skip, per-route override and instance-wide
//!   default check
//!
//! ## Example
//!
//! ```rust
//! use rolegate_authz::{
//!     catalog::{CatalogBuilder, RbacRouteConfig, RouteDefinition},
//!     check::WildcardCheck,
//!     config::RbacOptions,
//!     gate::{retriever_fn, AuthorizationGate, CallInfo},
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = RbacOptions::default();
//!     let mut builder = CatalogBuilder::new(&options);
//!     let binding = builder.register(
//!         RouteDefinition::new(["GET"], "/")
//!             .with_rbac(RbacRouteConfig::resource("index").operations(["read"])),
//!     );
//!     let catalog = Arc::new(builder.finalize());
//!
//!     let gate = AuthorizationGate::builder(catalog)
//!         .role_retriever(retriever_fn(|_: &()| vec!["index:read".to_string()]))
//!         .check(WildcardCheck)
//!         .options(&options)
//!         .build()?;
//!
//!     let decision = gate.decide(CallInfo::new("GET", "/"), Some(&binding), &()).await?;
//!     assert!(decision.is_allowed());
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod check;
pub mod config;
pub mod error;
pub mod gate;
pub mod role;

// Re-export commonly used types
pub use catalog::{CatalogBuilder, RbacCatalog, RbacRouteConfig, RouteBinding, RouteDefinition};
pub use check::{check_fn, BestMatchCheck, RoleCheck, WildcardCheck};
pub use config::RbacOptions;
pub use error::{AuthzError, Result};
pub use gate::{AuthorizationGate, CallInfo, Decision, Forbidden, RoleRetriever};
pub use role::{find_best_match, MatchCandidate, RoleTriple};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
