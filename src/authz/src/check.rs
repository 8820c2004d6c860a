//! Check functions
//!
//! A check function receives the roles a route requires and the roles the
//! caller holds and answers whether the call may proceed.

use crate::role::{find_best_match, SEPARATOR, WILDCARD};
use async_trait::async_trait;

/// Decides whether held roles satisfy required roles
///
/// Installed instance-wide on the gate and optionally overridden per route.
#[async_trait]
pub trait RoleCheck: Send + Sync {
    async fn check(&self, required: &[String], held: &[String]) -> anyhow::Result<bool>;
}

/// Resource/operation check that ignores the role sub-segment
///
/// Allows when either list contains `*`, or when some held role and some
/// required role agree on resource and operation, each exactly or through
/// `*`. The operation is everything after the first `:`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WildcardCheck;

impl WildcardCheck {
    pub fn allows(required: &[String], held: &[String]) -> bool {
        if held.iter().chain(required).any(|role| role == WILDCARD) {
            return true;
        }

        held.iter().any(|held| {
            required
                .iter()
                .any(|required| split_matches(required, held))
        })
    }
}

fn split(role: &str) -> (&str, &str) {
    role.split_once(SEPARATOR).unwrap_or((role, ""))
}

fn split_matches(required: &str, held: &str) -> bool {
    let segment_matches = |a: &str, b: &str| a == WILDCARD || b == WILDCARD || a == b;

    let (required_resource, required_operation) = split(required);
    let (held_resource, held_operation) = split(held);

    segment_matches(required_resource, held_resource)
        && segment_matches(required_operation, held_operation)
}

#[async_trait]
impl RoleCheck for WildcardCheck {
    async fn check(&self, required: &[String], held: &[String]) -> anyhow::Result<bool> {
        Ok(Self::allows(required, held))
    }
}

/// Role-aware check backed by the weighted best-match resolver
///
/// Allows when at least one `(required, held)` pair matches on resource,
/// role and operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestMatchCheck;

#[async_trait]
impl RoleCheck for BestMatchCheck {
    async fn check(&self, required: &[String], held: &[String]) -> anyhow::Result<bool> {
        let best = find_best_match(required, held);
        if let Some(candidate) = &best {
            tracing::trace!(
                required = candidate.required,
                weight = candidate.weight,
                "Best role match"
            );
        }
        Ok(best.is_some())
    }
}

/// A synchronous closure used as a check function
#[derive(Clone)]
pub struct FnCheck<F>(F);

/// Wraps a closure as a [`RoleCheck`]
///
/// ```
/// use rolegate_authz::check::check_fn;
/// use rolegate_authz::catalog::RbacRouteConfig;
///
/// let route = RbacRouteConfig::resource("index").check(check_fn(|_, _| true));
/// assert!(route.check.is_some());
/// ```
pub fn check_fn<F>(f: F) -> FnCheck<F>
where
    F: Fn(&[String], &[String]) -> bool + Send + Sync,
{
    FnCheck(f)
}

#[async_trait]
impl<F> RoleCheck for FnCheck<F>
where
    F: Fn(&[String], &[String]) -> bool + Send + Sync,
{
    async fn check(&self, required: &[String], held: &[String]) -> anyhow::Result<bool> {
        Ok((self.0)(required, held))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_wildcard_check_exact() {
        let check = WildcardCheck;
        assert!(check
            .check(&roles(&["index:read"]), &roles(&["index:read", "dynamic:read"]))
            .await
            .unwrap());
        assert!(!check
            .check(&roles(&["index:create"]), &roles(&["index:read", "dynamic:read"]))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_wildcard_check_wildcards() {
        let check = WildcardCheck;
        assert!(check.check(&roles(&["dynamic:*"]), &roles(&["dynamic:read"])).await.unwrap());
        assert!(check.check(&roles(&["index:read"]), &roles(&["*:read"])).await.unwrap());
        assert!(check.check(&roles(&["index:read"]), &roles(&["*"])).await.unwrap());
        assert!(check.check(&roles(&["*"]), &roles(&[])).await.unwrap());
    }

    #[test]
    fn test_wildcard_check_ignores_role_segment_boundaries() {
        // Everything after the resource is one operation string here.
        assert!(WildcardCheck::allows(
            &roles(&["account:admin:read"]),
            &roles(&["account:admin:read"])
        ));
        assert!(!WildcardCheck::allows(
            &roles(&["account:admin:read"]),
            &roles(&["account:read"])
        ));
        assert!(WildcardCheck::allows(
            &roles(&["account:admin:read"]),
            &roles(&["account:*"])
        ));
    }

    #[test]
    fn test_wildcard_check_empty_lists() {
        assert!(!WildcardCheck::allows(&[], &[]));
        assert!(!WildcardCheck::allows(&roles(&["index:read"]), &[]));
    }

    #[tokio::test]
    async fn test_best_match_check() {
        let check = BestMatchCheck;
        assert!(check
            .check(&roles(&["account:admin:read"]), &roles(&["*:*:*"]))
            .await
            .unwrap());
        assert!(!check
            .check(&roles(&["account:admin:read"]), &roles(&["*"]))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_fn_check() {
        let check = check_fn(|required, held| required.len() == held.len());
        assert!(check.check(&roles(&["a:b"]), &roles(&["c:d"])).await.unwrap());
        assert!(!check.check(&roles(&["a:b"]), &[]).await.unwrap());
    }
}
