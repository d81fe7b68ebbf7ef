use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use super::error::ApiError;
use super::{ApiHandler, ListLicenses, ValidateExpression, ValidateRequest};
use crate::license::registry::LicenseRegistry;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<LicenseRegistry>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `/licenses` and `/license-expressions/validate`
pub fn license_routes(state: AppState) -> Router {
    Router::new()
        .route("/licenses", get(list_licenses))
        .route("/license-expressions/validate", post(validate))
        .with_state(state)
}

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

async fn list_licenses(State(state): State<AppState>) -> impl IntoResponse {
    let (status, body) = ListLicenses.handle(&state.registry, ());
    (status, Json(body))
}

async fn validate(
    State(state): State<AppState>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let (status, body) = ValidateExpression.handle(&state.registry, request);
    Ok((status, Json(body)))
}
