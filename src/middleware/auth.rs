//! Authentication middleware
//!
//! Callers authenticate with a single shared public key sent in the
//! `x-api-key` header. There is no key store: the expected value comes from
//! `Settings::public_api_key`.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::config::Settings;
use crate::error::ApiError;

/// Header carrying the caller's public key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Message returned for any authentication failure
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing x-api-key header";

/// Check a presented key against the configured one
///
/// Absent or empty values on either side never authenticate. The
/// comparison is constant-time over the key bytes.
pub fn authenticate(provided: Option<&str>, expected: Option<&str>) -> bool {
    match (provided, expected) {
        (Some(provided), Some(expected)) if !provided.is_empty() && !expected.is_empty() => {
            provided.as_bytes().ct_eq(expected.as_bytes()).into()
        }
        _ => false,
    }
}

/// Authentication state required by the middleware
#[derive(Clone)]
pub struct AuthState {
    pub settings: Arc<Settings>,
}

impl AuthState {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}

/// Middleware rejecting requests without the configured public key
///
/// # Errors
/// - 401 Unauthorized: missing, empty or mismatched `x-api-key`
pub async fn require_public_key(
    State(auth_state): State<AuthState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided.is_none() {
        tracing::debug!("Request missing x-api-key header");
    }

    if !authenticate(provided, auth_state.settings.public_api_key.as_deref()) {
        return Err(ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()));
    }

    Ok(next.run(request).await)
}
