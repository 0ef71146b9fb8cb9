//! Health check endpoints
//!
//! Provides health, readiness and liveness probes. None of them require
//! authentication or touch the upstream.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::server::state::AppState;

/// Response for the main health check endpoint
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: u64,
}

/// Response for readiness probe
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
}

/// Individual readiness checks
#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub public_key_configured: bool,
    /// Number of keys `API_KEYS` parses to (0 when missing)
    pub key_pool_size: usize,
}

/// Response for liveness probe
#[derive(Serialize)]
pub struct LivenessResponse {
    pub alive: bool,
}

/// Main health check endpoint
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.settings.app_version.clone(),
        environment: state.settings.environment.to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Readiness probe endpoint
///
/// Ready when a public key is set and the key pool parses to at least one
/// key, i.e. when a correctly authenticated proxy call can reach upstream.
///
/// GET /ready
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let checks = ReadinessChecks {
        public_key_configured: state
            .settings
            .public_api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty()),
        key_pool_size: state.key_pool().map(|pool| pool.len()).unwrap_or(0),
    };

    let ready = checks.public_key_configured && checks.key_pool_size > 0;

    let status = if ready {
        StatusCode::OK
    } else {
        tracing::warn!(checks = ?checks, "Service not ready");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}

/// Liveness probe endpoint
///
/// GET /liveness
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { alive: true })
}
