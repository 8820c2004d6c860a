//! Route role catalog and role registry
//!
//! Built once during startup by a [`CatalogBuilder`], one
//! [`CatalogBuilder::register`] call per route in registration order, then
//! frozen by [`CatalogBuilder::finalize`] into a [`RbacCatalog`] that the
//! gate reads on every call.

use super::route::{route_key, Constraints, RouteBinding, RouteDefinition};
use crate::config::RbacOptions;
use crate::role::{SEPARATOR, WILDCARD};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resource name → operations declared for it
pub type ResourceHierarchy = BTreeMap<String, Vec<String>>;

/// Computes extra routing constraints for a route before its key is built
///
/// Lets one method + path pair represent several independently protected
/// variants (e.g. per API version or tenant). Implemented for plain closures.
pub trait ConstraintDeriver: Send + Sync {
    /// Returns constraints to merge into the route's own constraints
    fn derive(&self, route: &RouteDefinition) -> Option<Constraints>;
}

impl<F> ConstraintDeriver for F
where
    F: Fn(&RouteDefinition) -> Option<Constraints> + Send + Sync,
{
    fn derive(&self, route: &RouteDefinition) -> Option<Constraints> {
        self(route)
    }
}

/// Catalog key → required role strings, in registration order
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: HashMap<String, Arc<[String]>>,
    order: Vec<String>,
}

impl RouteTable {
    /// Returns the required roles stored under `key`
    pub fn get(&self, key: &str) -> Option<&Arc<[String]>> {
        self.entries.get(key)
    }

    /// Returns whether `key` has an entry
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Stores `roles` under `key`, replacing any previous entry
    pub fn insert(&mut self, key: impl Into<String>, roles: impl Into<Arc<[String]>>) {
        let key = key.into();
        if self.entries.insert(key.clone(), roles.into()).is_none() {
            self.order.push(key);
        }
    }

    /// Removes the entry stored under `key`
    pub fn remove(&mut self, key: &str) -> Option<Arc<[String]>> {
        let removed = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<[String]>)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get_key_value(key))
            .map(|(key, roles)| (key.as_str(), roles))
    }
}

/// Accumulates route declarations during startup
pub struct CatalogBuilder {
    routes: RouteTable,
    hierarchy: ResourceHierarchy,
    roles: Vec<String>,
    deriver: Option<Arc<dyn ConstraintDeriver>>,
}

impl CatalogBuilder {
    /// Creates a builder seeded with the configured additional privileges
    pub fn new(options: &RbacOptions) -> Self {
        Self {
            routes: RouteTable::default(),
            hierarchy: ResourceHierarchy::new(),
            roles: options.additional_privileges.clone(),
            deriver: None,
        }
    }

    /// Installs a constraint-derivation step run before every key computation
    pub fn with_constraint_deriver(mut self, deriver: impl ConstraintDeriver + 'static) -> Self {
        self.deriver = Some(Arc::new(deriver));
        self
    }

    /// Registers one route
    ///
    /// For every method of the route a catalog key is computed; the first
    /// registration of a key wins and later ones are ignored. Routes without
    /// a declared resource are not recorded. The returned binding carries the
    /// keys this call actually recorded.
    pub fn register(&mut self, mut route: RouteDefinition) -> RouteBinding {
        if let Some(derived) = self
            .deriver
            .as_ref()
            .and_then(|d| d.derive(&route))
            .filter(|derived| !derived.is_empty())
        {
            route
                .constraints
                .get_or_insert_with(Constraints::new)
                .extend(derived);
        }

        let mut binding = RouteBinding::unprotected();
        binding.rbac = route.rbac.clone();
        binding.constraints = route.constraints.clone();

        let Some(resource) = route.rbac.as_ref().and_then(|r| r.resource.as_deref()) else {
            return binding;
        };
        let operations = route
            .rbac
            .as_ref()
            .map(|r| r.normalized_operations())
            .unwrap_or_default();

        for method in &route.methods {
            let key = route_key(method, &route.path, route.constraints.as_ref());
            if self.routes.contains_key(&key) {
                debug!(key = %key, "Route already registered, keeping first declaration");
                continue;
            }

            self.hierarchy
                .entry(resource.to_string())
                .or_insert_with(|| vec![WILDCARD.to_string()])
                .extend(operations.iter().cloned());

            let required: Vec<String> = operations
                .iter()
                .map(|operation| format!("{resource}{SEPARATOR}{operation}"))
                .collect();

            self.roles.push(format!("{resource}{SEPARATOR}{WILDCARD}"));
            self.roles.extend(required.iter().cloned());

            debug!(key = %key, roles = ?required, "Registered route roles");
            binding.insert_key(method, key.clone());
            self.routes.insert(key, required);
        }

        binding
    }

    /// Deduplicates the registry and hierarchy and freezes the catalog
    pub fn finalize(self) -> RbacCatalog {
        let roles = dedup(self.roles);
        let hierarchy: ResourceHierarchy = self
            .hierarchy
            .into_iter()
            .map(|(resource, operations)| (resource, dedup(operations)))
            .collect();

        info!(
            "RBAC catalog finalized with {} roles, {} routes, {} resources",
            roles.len(),
            self.routes.len(),
            hierarchy.len()
        );

        RbacCatalog {
            roles,
            hierarchy,
            routes: RwLock::new(self.routes),
        }
    }
}

/// Set semantics, keeping the first occurrence of each entry
pub(crate) fn dedup<T: Eq + Hash + Clone>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// The finalized, read-mostly catalog
///
/// Shared with the gate through an `Arc`. The role registry and resource
/// hierarchy are immutable; the route table can only be changed through
/// [`RbacCatalog::reconfigure_unchecked`].
#[derive(Debug)]
pub struct RbacCatalog {
    roles: Vec<String>,
    hierarchy: ResourceHierarchy,
    routes: RwLock<RouteTable>,
}

impl RbacCatalog {
    /// Every known role string, deduplicated
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Resource → declared operations, deduplicated
    pub fn hierarchy(&self) -> &ResourceHierarchy {
        &self.hierarchy
    }

    /// Required roles for a catalog key
    pub fn required_roles(&self, key: &str) -> Option<Arc<[String]>> {
        self.routes.read().get(key).cloned()
    }

    /// Snapshot of the route table
    pub fn routes(&self) -> RouteTable {
        self.routes.read().clone()
    }

    /// Mutates the live route table
    ///
    /// Decisions made after this returns observe the new table. Decisions
    /// already past their catalog lookup keep the roles they read. Meant for
    /// tests and deliberate runtime reconfiguration only.
    pub fn reconfigure_unchecked<R>(&self, f: impl FnOnce(&mut RouteTable) -> R) -> R {
        warn!("RBAC route table reconfigured at runtime");
        f(&mut self.routes.write())
    }
}
