//! HTTP surface of the license registry.
//!
//! Each endpoint's logic lives behind [`ApiHandler`] so it can be exercised
//! without a running server; [`routes`] adapts the handlers to axum.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::license::registry::LicenseRegistry;
use crate::license::validator::validate_expression;
use crate::models::{License, ValidationBody};

pub mod error;
pub mod routes;

/// One endpoint: turn a decoded request into a status and a serializable body.
pub trait ApiHandler {
    type Request;
    type Response: Serialize;

    fn handle(
        &self,
        registry: &LicenseRegistry,
        request: Self::Request,
    ) -> (StatusCode, Self::Response);
}

/// `GET /licenses`
pub struct ListLicenses;

impl ApiHandler for ListLicenses {
    type Request = ();
    type Response = Vec<License>;

    fn handle(&self, registry: &LicenseRegistry, _request: ()) -> (StatusCode, Vec<License>) {
        (StatusCode::OK, registry.iter().cloned().collect())
    }
}

/// Body of `POST /license-expressions/validate`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateRequest {
    pub expression: String,
}

/// `POST /license-expressions/validate`
pub struct ValidateExpression;

impl ApiHandler for ValidateExpression {
    type Request = ValidateRequest;
    type Response = ValidationBody;

    fn handle(
        &self,
        registry: &LicenseRegistry,
        request: ValidateRequest,
    ) -> (StatusCode, ValidationBody) {
        let (status, body) = validate_expression(registry, &request.expression);
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
        (status, body)
    }
}
