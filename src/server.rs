//! HTTP server: router assembly, middleware and the listen loop.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::routes::{health_routes, license_routes, AppState};
use crate::config::ServerConfig;
use crate::license::registry::LicenseRegistry;

/// Build the combined router with all endpoints.
pub fn build_router(registry: Arc<LicenseRegistry>, config: &ServerConfig) -> Router {
    let cors = if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|s| match s.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!(origin = %s, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(health_routes())
        .merge(license_routes(AppState { registry }))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind `config.bind` and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, registry: Arc<LicenseRegistry>) -> Result<()> {
    let addr: SocketAddr = config
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.bind))?;

    let licenses = registry.len();
    let router = build_router(registry, config);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(%addr, licenses, "license API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let registry = Arc::new(LicenseRegistry::builtin().unwrap());
        build_router(registry, &ServerConfig::default())
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn validate_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/license-expressions/validate")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let resp = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_licenses() {
        let resp = app()
            .oneshot(Request::builder().uri("/licenses").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        let entries = body.as_array().unwrap();
        assert!(entries.len() >= 520);
        assert!(entries.iter().any(|e| e["origin"] == "SPDX"));
        assert!(entries.iter().any(|e| e["origin"] == "Custom"));
        assert_eq!(entries[0].as_object().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_validate_known_expression() {
        let body = json!({"expression": "Apache-2.0 WITH Commons-Clause OR MIT"}).to_string();
        let resp = app().oneshot(validate_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"unknown_tokens": []}));
    }

    #[tokio::test]
    async fn test_validate_unknown_license() {
        let body = json!({"expression": "FooBar-1.0"}).to_string();
        let resp = app().oneshot(validate_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"unknown_tokens": ["FooBar-1.0"]}));
    }

    #[tokio::test]
    async fn test_validate_syntax_error() {
        let body = json!({"expression": "Apache-2.0 AND ("}).to_string();
        let resp = app().oneshot(validate_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = body_json(resp).await;
        let error = body["error"].as_str().unwrap();
        assert!(!error.is_empty());
        assert_eq!(body.as_object().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_validate_long_chain() {
        let expression = vec!["MIT"; 100_000].join(" AND ");
        let body = json!({ "expression": expression }).to_string();
        let resp = app().oneshot(validate_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"unknown_tokens": []}));

        let expression = vec!["FooBar-1.0 OR MIT"; 50_000].join(" OR ");
        let body = json!({ "expression": expression }).to_string();
        let resp = app().oneshot(validate_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"unknown_tokens": ["FooBar-1.0"]}));
    }

    #[tokio::test]
    async fn test_validate_malformed_body() {
        let resp = app()
            .oneshot(validate_request("{not json".to_string()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"].is_string());

        let resp = app()
            .oneshot(validate_request(json!({"expr": "MIT"}).to_string()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_validate_requires_json_content_type() {
        let resp = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/license-expressions/validate")
                    .body(Body::from(r#"{"expression": "MIT"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let resp = app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_configured_cors_origin() {
        let config = ServerConfig {
            cors_origins: vec!["https://app.example.com".to_string()],
            ..ServerConfig::default()
        };
        let app = build_router(Arc::new(LicenseRegistry::builtin().unwrap()), &config);
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "https://app.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            resp.headers()["access-control-allow-origin"],
            "https://app.example.com"
        );
    }
}
