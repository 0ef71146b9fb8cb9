//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::schemas::{ErrorEnvelope, ErrorMetadata};
use crate::services::{ConfigurationError, UpstreamError};

/// Message returned to callers for unexpected failures
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Failures surfaced by the proxy endpoint
///
/// Each variant is terminal for its gate and renders its own envelope.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Upstream API failed: {source}")]
    Upstream {
        source: UpstreamError,
        metadata: ErrorMetadata,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Configuration(_)
            | ApiError::Upstream { .. }
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response envelope for this error
    pub fn envelope(&self) -> ErrorEnvelope {
        match self {
            ApiError::Unauthorized(msg) => ErrorEnvelope::new("Unauthorized", msg.as_str()),
            ApiError::Configuration(err) => {
                ErrorEnvelope::new("Configuration error", err.to_string())
            }
            ApiError::Upstream { source, metadata } => {
                ErrorEnvelope::new("Upstream API failed", source.to_string())
                    .with_metadata(metadata.clone())
            }
            ApiError::Internal(_) => {
                ErrorEnvelope::new("Internal server error", INTERNAL_ERROR_MESSAGE).with_timestamp()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Unauthorized(msg) => {
                tracing::warn!(reason = %msg, "Rejected unauthenticated request");
            }
            ApiError::Configuration(err) => {
                tracing::error!(error = %err, "Key pool configuration error");
            }
            ApiError::Upstream { source, metadata } => {
                tracing::error!(
                    error = %source,
                    upstream_url = %metadata.upstream_url,
                    method = %metadata.method,
                    timeout = source.is_timeout(),
                    "Upstream API error"
                );
            }
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "Proxy function error");
            }
        }

        (self.status_code(), Json(self.envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn metadata() -> ErrorMetadata {
        ErrorMetadata {
            upstream_url: "https://upstream.test".to_string(),
            method: "GET".to_string(),
            key_rotation_mode: "round".to_string(),
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Configuration(ConfigurationError::NotConfigured)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_configuration_envelope() {
        let envelope = ApiError::from(ConfigurationError::NotConfigured).envelope();
        assert_eq!(envelope.error, "Configuration error");
        assert_eq!(envelope.message, "API_KEYS not configured");
        assert!(envelope.metadata.is_none());
        assert!(envelope.timestamp.is_none());
    }

    #[test]
    fn test_upstream_envelope_carries_metadata() {
        let err = ApiError::Upstream {
            source: UpstreamError::Timeout(Duration::from_secs(10)),
            metadata: metadata(),
        };
        let envelope = err.envelope();
        assert_eq!(envelope.error, "Upstream API failed");
        assert_eq!(envelope.message, "timeout of 10000ms exceeded");
        assert_eq!(envelope.metadata, Some(metadata()));
    }

    #[test]
    fn test_internal_envelope_hides_detail() {
        let envelope = ApiError::Internal(anyhow::anyhow!("secret detail")).envelope();
        assert_eq!(envelope.error, "Internal server error");
        assert_eq!(envelope.message, INTERNAL_ERROR_MESSAGE);
        assert!(envelope.timestamp.is_some());
    }
}
