//! Middleware layer for the API server
//!
//! This module provides:
//! - The RBAC guard run before every protected handler
//! - Header-based role retrieval for the demo server
//! - Request logging

use crate::error::ApiError;
use async_trait::async_trait;
use axum::{
    extract::{MatchedPath, Request, State},
    http::{request::Parts, Method},
    middleware::Next,
    response::Response,
};
use rolegate_authz::catalog::RouteBinding;
use rolegate_authz::gate::{AuthorizationGate, CallInfo, Decision, RoleRetriever};
use std::sync::Arc;
use tracing::{debug, info};

/// Held roles header read by [`HeaderRoles`]
pub const X_ROLES: &str = "x-roles";

/// Gate deciding HTTP calls from their request parts
pub type HttpGate = AuthorizationGate<Parts>;

/// State of the RBAC guard of one route
#[derive(Clone)]
pub struct RouteGuard {
    pub gate: Arc<HttpGate>,
    pub binding: Arc<RouteBinding>,
}

/// RBAC guard middleware
///
/// Installed as a route layer so that it sees the matched route pattern and
/// the route's binding. Denials become 403 responses; failures of the role
/// retriever or check function become 500 responses.
pub async fn rbac_middleware(
    State(guard): State<RouteGuard>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let path = parts
        .extensions
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    // axum serves HEAD through GET handlers; check it as the GET it becomes.
    let method = if parts.method == Method::HEAD && guard.binding.key_for("HEAD").is_none() {
        Method::GET
    } else {
        parts.method.clone()
    };

    let decision = guard
        .gate
        .decide(
            CallInfo::new(method.as_str(), &path),
            Some(guard.binding.as_ref()),
            &parts,
        )
        .await?;

    match decision {
        Decision::Allow(reason) => {
            debug!(method = %parts.method, path = %path, reason = ?reason, "Request allowed");
            Ok(next.run(Request::from_parts(parts, body)).await)
        }
        Decision::Forbidden(forbidden) => Err(ApiError::Forbidden(forbidden.message)),
    }
}

/// Reads held roles from a comma-separated `x-roles` header
///
/// Stands in for a session or token lookup in the demo server.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderRoles;

#[async_trait]
impl RoleRetriever<Parts> for HeaderRoles {
    async fn retrieve_roles(&self, parts: &Parts) -> anyhow::Result<Vec<String>> {
        let Some(value) = parts.headers.get(X_ROLES) else {
            return Ok(Vec::new());
        };

        Ok(value
            .to_str()?
            .split(',')
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Request logging middleware
///
/// Logs all incoming requests with method, URI, and response status.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        info!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            duration_ms = elapsed.as_millis() as u64,
            "Request rejected"
        );
    } else {
        debug!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            duration_ms = elapsed.as_millis() as u64,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts_with_roles(value: Option<&str>) -> Parts {
        let mut builder = HttpRequest::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header(X_ROLES, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_header_roles_split_and_trim() {
        let parts = parts_with_roles(Some("index:read, dynamic:read,,"));
        let roles = HeaderRoles.retrieve_roles(&parts).await.unwrap();
        assert_eq!(roles, vec!["index:read", "dynamic:read"]);
    }

    #[tokio::test]
    async fn test_header_roles_missing_header() {
        let parts = parts_with_roles(None);
        let roles = HeaderRoles.retrieve_roles(&parts).await.unwrap();
        assert!(roles.is_empty());
    }

    #[tokio::test]
    async fn test_header_roles_rejects_opaque_header() {
        let mut parts = parts_with_roles(None);
        parts.headers.insert(
            X_ROLES,
            axum::http::HeaderValue::from_bytes(b"index:\xffread").unwrap(),
        );
        assert!(HeaderRoles.retrieve_roles(&parts).await.is_err());
    }
}
