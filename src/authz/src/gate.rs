//! Per-call authorization gate
//!
//! Runs before a route's handler and turns the route's declaration, the
//! catalog entry and the caller's roles into an allow/deny decision.
//!
//! # Pipeline
//!
//! ```text
//! no declaration ─┐
//! skip ───────────┤
//! no resource ────┼─→ Allow
//! no catalog entry┘
//!       │
//!       ▼
//! RoleRetriever → route check ?? default check → Allow | Forbidden(403)
//! ```

use crate::catalog::{route_key, RbacCatalog, RouteBinding};
use crate::check::RoleCheck;
use crate::config::{RbacOptions, DEFAULT_FORBIDDEN_MESSAGE};
use crate::error::{AuthzError, Result};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Status code of every denial
pub const FORBIDDEN_STATUS: u16 = 403;

/// Retrieves the roles held by the caller of a request
///
/// `C` is whatever per-call context the host hands to the gate (request
/// parts, a session, ...).
#[async_trait]
pub trait RoleRetriever<C: ?Sized + Sync>: Send + Sync {
    async fn retrieve_roles(&self, ctx: &C) -> anyhow::Result<Vec<String>>;
}

/// A synchronous closure used as a role retriever
pub struct RetrieverFn<F, C: ?Sized> {
    f: F,
    _ctx: PhantomData<fn(&C)>,
}

/// Wraps a closure as a [`RoleRetriever`]
pub fn retriever_fn<C, F>(f: F) -> RetrieverFn<F, C>
where
    C: ?Sized + Sync,
    F: Fn(&C) -> Vec<String> + Send + Sync,
{
    RetrieverFn {
        f,
        _ctx: PhantomData,
    }
}

#[async_trait]
impl<C, F> RoleRetriever<C> for RetrieverFn<F, C>
where
    C: ?Sized + Sync,
    F: Fn(&C) -> Vec<String> + Send + Sync,
{
    async fn retrieve_roles(&self, ctx: &C) -> anyhow::Result<Vec<String>> {
        Ok((self.f)(ctx))
    }
}

/// Method and path of the call being decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallInfo<'a> {
    pub method: &'a str,
    /// Route path pattern, used when the binding has no precomputed key
    pub path: &'a str,
}

impl<'a> CallInfo<'a> {
    pub fn new(method: &'a str, path: &'a str) -> Self {
        Self { method, path }
    }
}

/// Which step let the call through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// The route has no authorization declaration
    NoDeclaration,
    /// The route is marked `skip`
    Skipped,
    /// The declaration names no resource
    NoResource,
    /// Nothing was registered under the route's key
    NoCatalogEntry,
    /// The check function approved the caller's roles
    CheckPassed,
}

/// Denial outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forbidden {
    pub status_code: u16,
    pub message: String,
}

/// Outcome of the gate for one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(AllowReason),
    Forbidden(Forbidden),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// The per-call decision pipeline
///
/// Only reads the catalog, so one gate can decide any number of calls
/// concurrently.
pub struct AuthorizationGate<C: ?Sized + Sync> {
    catalog: Arc<RbacCatalog>,
    retriever: Arc<dyn RoleRetriever<C>>,
    check: Arc<dyn RoleCheck>,
    forbidden_message: String,
}

impl<C: ?Sized + Sync> AuthorizationGate<C> {
    /// Starts configuring a gate over a finalized catalog
    pub fn builder(catalog: Arc<RbacCatalog>) -> GateBuilder<C> {
        GateBuilder {
            catalog,
            retriever: None,
            check: None,
            forbidden_message: DEFAULT_FORBIDDEN_MESSAGE.to_string(),
        }
    }

    /// The catalog this gate reads
    pub fn catalog(&self) -> &Arc<RbacCatalog> {
        &self.catalog
    }

    /// Decides one call
    ///
    /// `binding` is what registration returned for the matched route, or
    /// `None` for a route that was never declared. Failures of the role
    /// retriever or the check function are returned as errors; a denial is
    /// `Ok(Decision::Forbidden(_))`.
    pub async fn decide(
        &self,
        call: CallInfo<'_>,
        binding: Option<&RouteBinding>,
        ctx: &C,
    ) -> Result<Decision> {
        let Some(rbac) = binding.and_then(|b| b.rbac.as_ref()) else {
            return Ok(Decision::Allow(AllowReason::NoDeclaration));
        };
        if rbac.skip {
            return Ok(Decision::Allow(AllowReason::Skipped));
        }
        if rbac.resource.is_none() {
            return Ok(Decision::Allow(AllowReason::NoResource));
        }

        // Without a precomputed key, constraints cannot be reconstructed.
        let key = binding
            .and_then(|b| b.key_for(call.method))
            .map_or_else(|| route_key(call.method, call.path, None), str::to_string);

        let Some(required) = self.catalog.required_roles(&key) else {
            debug!(key = %key, "No roles registered for route");
            return Ok(Decision::Allow(AllowReason::NoCatalogEntry));
        };

        let held = self
            .retriever
            .retrieve_roles(ctx)
            .await
            .map_err(AuthzError::RoleRetrieval)?;

        let check = rbac.check.as_ref().unwrap_or(&self.check);
        let passed = check
            .check(&required, &held)
            .await
            .map_err(AuthzError::CheckFailed)?;

        if passed {
            debug!(key = %key, "Authorization passed");
            Ok(Decision::Allow(AllowReason::CheckPassed))
        } else {
            warn!(method = %call.method, key = %key, "Authorization denied");
            Ok(Decision::Forbidden(Forbidden {
                status_code: FORBIDDEN_STATUS,
                message: self.forbidden_message.clone(),
            }))
        }
    }
}

/// Collects the gate's collaborators; see [`AuthorizationGate::builder`]
pub struct GateBuilder<C: ?Sized + Sync> {
    catalog: Arc<RbacCatalog>,
    retriever: Option<Arc<dyn RoleRetriever<C>>>,
    check: Option<Arc<dyn RoleCheck>>,
    forbidden_message: String,
}

impl<C: ?Sized + Sync> GateBuilder<C> {
    /// Sets the role-retrieval collaborator (required)
    pub fn role_retriever(mut self, retriever: impl RoleRetriever<C> + 'static) -> Self {
        self.retriever = Some(Arc::new(retriever));
        self
    }

    /// Sets the instance-wide check function (required)
    pub fn check(mut self, check: impl RoleCheck + 'static) -> Self {
        self.check = Some(Arc::new(check));
        self
    }

    /// Sets the message carried by denials
    pub fn forbidden_message(mut self, message: impl Into<String>) -> Self {
        self.forbidden_message = message.into();
        self
    }

    /// Applies instance-wide options
    pub fn options(self, options: &RbacOptions) -> Self {
        self.forbidden_message(options.forbidden_message.clone())
    }

    /// Builds the gate
    ///
    /// Fails when the role retriever or the check function is missing.
    pub fn build(self) -> Result<AuthorizationGate<C>> {
        let retriever = self
            .retriever
            .ok_or(AuthzError::MissingConfiguration("role_retriever"))?;
        let check = self
            .check
            .ok_or(AuthzError::MissingConfiguration("check"))?;

        Ok(AuthorizationGate {
            catalog: self.catalog,
            retriever,
            check,
            forbidden_message: self.forbidden_message,
        })
    }
}
