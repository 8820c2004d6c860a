//! Route declarations and catalog keys

use crate::check::RoleCheck;
use crate::role::{SEPARATOR, WILDCARD};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Extra routing constraints (e.g. version or host) attached to a route
///
/// Serialized into the catalog key with sorted keys, so two routes sharing a
/// method and path but differing in constraints get distinct entries.
pub type Constraints = serde_json::Map<String, Value>;

/// Authorization declaration of a single route
#[derive(Clone, Default)]
pub struct RbacRouteConfig {
    /// Protected resource; `None` disables enforcement for the route
    pub resource: Option<String>,

    /// Allowed operations; `None` or empty allows every operation
    pub operations: Option<Vec<String>>,

    /// Skip the check entirely
    pub skip: bool,

    /// Route-level check, used instead of the gate's default check
    pub check: Option<Arc<dyn RoleCheck>>,
}

impl RbacRouteConfig {
    /// Declares a protected resource
    pub fn resource(resource: impl Into<String>) -> Self {
        Self {
            resource: Some(resource.into()),
            ..Self::default()
        }
    }

    /// Restricts the route to the given operations
    pub fn operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operations = Some(operations.into_iter().map(Into::into).collect());
        self
    }

    /// Marks the route as exempt from checking
    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    /// Overrides the gate's default check for this route
    pub fn check(mut self, check: impl RoleCheck + 'static) -> Self {
        self.check = Some(Arc::new(check));
        self
    }

    /// Operations with the "allow all" default applied
    pub(crate) fn normalized_operations(&self) -> Vec<String> {
        match &self.operations {
            Some(operations) if !operations.is_empty() => operations.clone(),
            _ => vec![WILDCARD.to_string()],
        }
    }
}

impl fmt::Debug for RbacRouteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RbacRouteConfig")
            .field("resource", &self.resource)
            .field("operations", &self.operations)
            .field("skip", &self.skip)
            .field("check", &self.check.as_ref().map(|_| "<override>"))
            .finish()
    }
}

/// A route as seen by the registration call
#[derive(Debug, Clone, Default)]
pub struct RouteDefinition {
    /// HTTP methods served by the route
    pub methods: Vec<String>,

    /// Route path pattern (e.g. `/accounts/:id`)
    pub path: String,

    /// Extra routing constraints
    pub constraints: Option<Constraints>,

    /// Authorization declaration
    pub rbac: Option<RbacRouteConfig>,
}

impl RouteDefinition {
    /// Creates a route definition without constraints or declaration
    pub fn new<I, S>(methods: I, path: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: methods.into_iter().map(Into::into).collect(),
            path: path.into(),
            constraints: None,
            rbac: None,
        }
    }

    /// Adds a routing constraint
    pub fn with_constraint(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constraints
            .get_or_insert_with(Constraints::new)
            .insert(key.into(), value.into());
        self
    }

    /// Attaches an authorization declaration
    pub fn with_rbac(mut self, rbac: RbacRouteConfig) -> Self {
        self.rbac = Some(rbac);
        self
    }
}

/// Computes the catalog key of a route for one method
///
/// `METHOD:path`, followed by ` - {constraints}` when constraints are present.
pub fn route_key(method: &str, path: &str, constraints: Option<&Constraints>) -> String {
    let mut key = format!("{}{SEPARATOR}{path}", method.to_ascii_uppercase());
    if let Some(constraints) = constraints {
        key.push_str(" - ");
        key.push_str(&Value::Object(constraints.clone()).to_string());
    }
    key
}

/// What the registration call hands back to the host for one route
///
/// The host keeps the binding next to the route and passes it to every
/// decision call for that route.
#[derive(Debug, Clone, Default)]
pub struct RouteBinding {
    /// The route's authorization declaration
    pub rbac: Option<RbacRouteConfig>,

    /// Constraints after derivation
    pub constraints: Option<Constraints>,

    /// Precomputed catalog key per (uppercase) method
    keys: HashMap<String, String>,
}

impl RouteBinding {
    /// Binding for a route without any declaration
    pub fn unprotected() -> Self {
        Self::default()
    }

    /// Returns the key precomputed at registration for `method`
    pub fn key_for(&self, method: &str) -> Option<&str> {
        self.keys
            .get(&method.to_ascii_uppercase())
            .map(String::as_str)
    }

    pub(crate) fn insert_key(&mut self, method: &str, key: String) {
        self.keys.insert(method.to_ascii_uppercase(), key);
    }
}
