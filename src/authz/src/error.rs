//! Error types for the authorization engine

use thiserror::Error;

/// Authorization engine errors
///
/// A denied call is not an error, see [`crate::gate::Decision::Forbidden`].
#[derive(Debug, Error)]
pub enum AuthzError {
    /// A required collaborator was not configured before startup
    #[error("\"{0}\" must be configured")]
    MissingConfiguration(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The role-retrieval collaborator failed
    #[error("Role retrieval failed: {0}")]
    RoleRetrieval(#[source] anyhow::Error),

    /// The check function failed
    #[error("Role check failed: {0}")]
    CheckFailed(#[source] anyhow::Error),
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
