//! Application routing
//!
//! This module defines all HTTP routes for the application.

use axum::{
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;

use crate::api::{diagnostics, health, proxy};
use crate::error::ApiError;
use crate::middleware::{
    auth::{require_public_key, AuthState},
    cors::with_cors,
    logging::log_request,
};
use crate::server::state::AppState;

/// Create the main application router
///
/// Gate order for `/api/proxy`: preflight short-circuit, authentication,
/// then the handler. CORS headers are added to every response.
pub fn create_router(state: AppState) -> Router {
    let auth_state = AuthState::new(state.settings.clone());

    // Health check routes (no authentication required)
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness))
        .route("/liveness", get(health::liveness));

    let api_routes = Router::new()
        .route(
            "/api/proxy",
            any(proxy::proxy).layer(middleware::from_fn_with_state(
                auth_state,
                require_public_key,
            )),
        )
        .route("/api/test", any(diagnostics::echo));

    // Panics are caught innermost so the CORS headers still apply
    let router = Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .layer(CatchPanicLayer::custom(panic_response));

    with_cors(router)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Render a handler panic as the internal error envelope
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    ApiError::Internal(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use axum::body::Body;
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    fn router() -> Router {
        let settings = Settings {
            public_api_key: Some("pub1".to_string()),
            api_keys: Some("abc".to_string()),
            ..Settings::default()
        };
        create_router(AppState::new(settings).unwrap())
    }

    #[tokio::test]
    async fn test_router_builds_and_serves_health() {
        let request = axum::http::Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_proxy_requires_public_key_for_any_method() {
        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
            let request = axum::http::Request::builder()
                .method(method)
                .uri("/api/proxy")
                .body(Body::empty())
                .unwrap();
            let response = router().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn test_proxy_preflight_skips_authentication() {
        let request = axum::http::Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/proxy")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
