//! axum integration for rolegate-authz
//!
//! Registers routes in the RBAC catalog, guards them with the authorization
//! gate and exposes the catalog through introspection endpoints.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, Result};
pub use routes::{create_router, DefaultCheck, RbacRouter};
pub use server::Server;
pub use state::AppState;
