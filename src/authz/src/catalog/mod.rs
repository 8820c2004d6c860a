//! Route role catalog
//!
//! Records, per protected route and method, the role strings the route
//! requires, together with the registry of every role ever declared and the
//! resource → operations hierarchy.
//!
//! # Example
//!
//! ```rust
//! use rolegate_authz::catalog::{CatalogBuilder, RbacRouteConfig, RouteDefinition};
//! use rolegate_authz::config::RbacOptions;
//!
//! let mut builder = CatalogBuilder::new(&RbacOptions::default());
//! let binding = builder.register(
//!     RouteDefinition::new(["GET"], "/accounts")
//!         .with_rbac(RbacRouteConfig::resource("account").operations(["read"])),
//! );
//! let catalog = builder.finalize();
//!
//! assert_eq!(binding.key_for("GET"), Some("GET:/accounts"));
//! assert_eq!(catalog.required_roles("GET:/accounts").unwrap().as_ref(), ["account:read"]);
//! ```

mod registry;
mod route;

pub use registry::{
    CatalogBuilder, ConstraintDeriver, RbacCatalog, ResourceHierarchy, RouteTable,
};
pub use route::{route_key, Constraints, RbacRouteConfig, RouteBinding, RouteDefinition};
