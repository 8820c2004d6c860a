//! Route definitions for the API server
//!
//! Routes are registered through [`RbacRouter`], which records each route's
//! authorization declaration in the RBAC catalog and wraps the handler with
//! the RBAC guard. Routes are organized by functionality:
//! - Health endpoint (undeclared)
//! - Account endpoints (`account` resource)
//! - RBAC introspection (`rbac` resource)

use crate::{
    handlers,
    middleware::{self, HeaderRoles, HttpGate, RouteGuard},
    state::AppState,
};
use anyhow::anyhow;
use axum::{
    handler::Handler,
    http::{request::Parts, Method},
    middleware as axum_middleware,
    routing::{MethodFilter, MethodRouter},
    Router,
};
use rolegate_authz::{
    catalog::{CatalogBuilder, ConstraintDeriver, RbacRouteConfig, RouteBinding, RouteDefinition},
    check::{BestMatchCheck, WildcardCheck},
    config::RbacOptions,
    gate::{AuthorizationGate, GateBuilder},
};
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Instance-wide check function selectable at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DefaultCheck {
    /// Resource/operation matching, role sub-segment ignored
    #[default]
    Wildcard,
    /// Weighted three-segment best match
    BestMatch,
}

struct PendingRoute<S> {
    path: String,
    handler: MethodRouter<S>,
    binding: RouteBinding,
}

/// Router builder that registers every route in the RBAC catalog
///
/// Routes are registered in call order, so the first declaration of a
/// method and path wins. Handlers are served on the declared methods only,
/// which keeps the router and the catalog in agreement.
/// [`RbacRouter::finalize`] freezes the catalog, builds the gate and wraps
/// every handler with the guard.
pub struct RbacRouter<S = ()> {
    catalog: CatalogBuilder,
    routes: Vec<PendingRoute<S>>,
    served: HashSet<(String, Method)>,
    error: Option<anyhow::Error>,
}

impl<S> RbacRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(options: &RbacOptions) -> Self {
        Self {
            catalog: CatalogBuilder::new(options),
            routes: Vec::new(),
            served: HashSet::new(),
            error: None,
        }
    }

    /// Installs a constraint-derivation step, see [`ConstraintDeriver`]
    pub fn with_constraint_deriver(mut self, deriver: impl ConstraintDeriver + 'static) -> Self {
        self.catalog = self.catalog.with_constraint_deriver(deriver);
        self
    }

    /// Adds a route serving `handler` on `methods` at `path`
    ///
    /// `rbac` is the route's authorization declaration; `None` leaves the
    /// route unprotected. Methods already served at `path` by an earlier
    /// route are left to that route.
    pub fn route<H, T>(
        mut self,
        path: &str,
        methods: &[Method],
        handler: H,
        rbac: Option<RbacRouteConfig>,
    ) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        let mut definition = RouteDefinition::new(methods.iter().map(Method::as_str), path);
        definition.rbac = rbac;
        let binding = self.catalog.register(definition);

        let mut filter: Option<MethodFilter> = None;
        for method in methods {
            if !self.served.insert((path.to_string(), method.clone())) {
                debug!(method = %method, path, "Method already served, keeping first route");
                continue;
            }
            match MethodFilter::try_from(method.clone()) {
                Ok(next) => filter = Some(filter.map_or(next, |f| f.or(next))),
                Err(e) => {
                    self.error
                        .get_or_insert_with(|| anyhow!("{} {}: {}", method, path, e));
                }
            }
        }

        if let Some(filter) = filter {
            self.routes.push(PendingRoute {
                path: path.to_string(),
                handler: MethodRouter::new().on(filter, handler),
                binding,
            });
        }
        self
    }

    /// Freezes the catalog and produces the guarded router
    ///
    /// `configure` supplies the gate's role retriever and check function.
    pub fn finalize<F>(self, configure: F) -> anyhow::Result<(Router<S>, Arc<HttpGate>)>
    where
        F: FnOnce(GateBuilder<Parts>) -> GateBuilder<Parts>,
    {
        if let Some(error) = self.error {
            return Err(error.context("Unsupported route method"));
        }

        let catalog = Arc::new(self.catalog.finalize());
        let gate = Arc::new(configure(AuthorizationGate::builder(catalog)).build()?);

        let router = self.routes.into_iter().fold(Router::new(), |router, route| {
            let guard = RouteGuard {
                gate: gate.clone(),
                binding: Arc::new(route.binding),
            };
            let handler = route.handler.route_layer(axum_middleware::from_fn_with_state(
                guard,
                middleware::rbac_middleware,
            ));
            router.route(&route.path, handler)
        });

        Ok((router, gate))
    }
}

fn declare(resource: &str, operation: &str) -> Option<RbacRouteConfig> {
    Some(RbacRouteConfig::resource(resource).operations([operation]))
}

/// Create the application router with all routes and middleware
pub fn create_router(options: &RbacOptions, default_check: DefaultCheck) -> anyhow::Result<Router> {
    options.validate()?;

    let (router, gate) = RbacRouter::<AppState>::new(options)
        // Health (no declaration)
        .route("/health", &[Method::GET], handlers::health_check, None)
        // Account endpoints
        .route(
            "/accounts",
            &[Method::GET],
            handlers::list_accounts,
            declare("account", "read"),
        )
        .route(
            "/accounts",
            &[Method::POST],
            handlers::create_account,
            declare("account", "create"),
        )
        .route(
            "/accounts/:id",
            &[Method::GET],
            handlers::get_account,
            declare("account", "read"),
        )
        .route(
            "/accounts/:id",
            &[Method::DELETE],
            handlers::delete_account,
            declare("account", "admin:delete"),
        )
        // RBAC introspection
        .route(
            "/rbac/roles",
            &[Method::GET],
            handlers::list_roles,
            declare("rbac", "read"),
        )
        .route(
            "/rbac/routes",
            &[Method::GET],
            handlers::list_routes,
            declare("rbac", "read"),
        )
        .route(
            "/rbac/hierarchy",
            &[Method::GET],
            handlers::resource_hierarchy,
            declare("rbac", "read"),
        )
        .finalize(|gate| {
            let gate = gate.role_retriever(HeaderRoles).options(options);
            match default_check {
                DefaultCheck::Wildcard => gate.check(WildcardCheck),
                DefaultCheck::BestMatch => gate.check(BestMatchCheck),
            }
        })?;

    info!(check = ?default_check, "RBAC gate configured");
    let state = AppState::new(gate.catalog().clone());

    Ok(router
        .with_state(state)
        // Add middleware layers (executed bottom to top)
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use rolegate_authz::check::check_fn;
    use tower::ServiceExt;

    async fn ok() -> &'static str {
        "ok"
    }

    fn test_router(check: DefaultCheck) -> Router {
        create_router(&RbacOptions::default(), check).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = test_router(DefaultCheck::Wildcard);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_roles_required_for_declared_routes() {
        let app = test_router(DefaultCheck::Wildcard);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/accounts")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_declared_route_with_roles() {
        let app = test_router(DefaultCheck::BestMatch);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/accounts/7")
                    .header("x-roles", "account:read")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_options_rejected() {
        let options = RbacOptions {
            forbidden_message: String::new(),
            ..RbacOptions::default()
        };
        assert!(create_router(&options, DefaultCheck::Wildcard).is_err());
    }

    #[tokio::test]
    async fn test_finalize_requires_check() {
        let result = RbacRouter::<()>::new(&RbacOptions::default())
            .route("/", &[Method::GET], ok, declare("index", "read"))
            .finalize(|gate| gate.role_retriever(HeaderRoles));
        let err = result.err().unwrap();
        assert!(err.to_string().contains("check"));
    }

    #[tokio::test]
    async fn test_route_override_check() {
        let (router, _) = RbacRouter::<()>::new(&RbacOptions::default())
            .route(
                "/open",
                &[Method::GET],
                ok,
                Some(RbacRouteConfig::resource("open").check(check_fn(|_, _| true))),
            )
            .finalize(|gate| gate.role_retriever(HeaderRoles).check(WildcardCheck))
            .unwrap();

        let response = router
            .oneshot(Request::builder().uri("/open").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_head_checked_as_get() {
        let app = test_router(DefaultCheck::Wildcard);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::HEAD)
                    .uri("/accounts")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
