use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rolegate_authz::catalog::ResourceHierarchy;

use crate::{
    error::{ApiError, Result},
    models::*,
    state::AppState,
};

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Every role string known to the catalog
pub async fn list_roles(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.roles().to_vec())
}

/// Route table in registration order
pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteRoles>> {
    let routes = state
        .catalog
        .routes()
        .iter()
        .map(|(key, roles)| RouteRoles {
            key: key.to_string(),
            roles: roles.to_vec(),
        })
        .collect();
    Json(routes)
}

/// Resource → operations
pub async fn resource_hierarchy(State(state): State<AppState>) -> Json<ResourceHierarchy> {
    Json(state.catalog.hierarchy().clone())
}

pub async fn list_accounts() -> Json<Vec<Account>> {
    Json(vec![Account {
        id: "1".to_string(),
        name: "primary".to_string(),
    }])
}

pub async fn get_account(Path(id): Path<String>) -> Result<Json<Account>> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::NotFound(format!("Account {id}")));
    }

    Ok(Json(Account {
        id,
        name: "primary".to_string(),
    }))
}

pub async fn create_account(
    Json(req): Json<CreateAccountRequest>,
) -> (StatusCode, Json<Account>) {
    tracing::info!(name = %req.name, "Account created");
    (
        StatusCode::CREATED,
        Json(Account {
            id: "2".to_string(),
            name: req.name,
        }),
    )
}

pub async fn delete_account(Path(id): Path<String>) -> StatusCode {
    tracing::info!(id = %id, "Account deleted");
    StatusCode::NO_CONTENT
}
