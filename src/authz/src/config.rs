//! Instance-wide RBAC options

use crate::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};

/// Message carried by every denial unless configured otherwise
pub const DEFAULT_FORBIDDEN_MESSAGE: &str = "No Privilege";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacOptions {
    /// Message of the Forbidden outcome
    pub forbidden_message: String,

    /// Privileges merged into the role registry at startup
    pub additional_privileges: Vec<String>,
}

impl Default for RbacOptions {
    fn default() -> Self {
        Self {
            forbidden_message: DEFAULT_FORBIDDEN_MESSAGE.to_string(),
            additional_privileges: Vec::new(),
        }
    }
}

impl RbacOptions {
    pub fn validate(&self) -> Result<()> {
        if self.forbidden_message.is_empty() {
            return Err(AuthzError::InvalidConfig(
                "forbidden_message cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
