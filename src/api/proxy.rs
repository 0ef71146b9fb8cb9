//! Key-rotating proxy handler
//!
//! Runs after the preflight and authentication gates. Loads the key pool,
//! picks a credential, forwards one upstream request and shapes the result.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::ApiError;
use crate::schemas::{build_error_metadata, build_success, EnvelopeContext, SuccessEnvelope};
use crate::server::AppState;
use crate::services::key_pool::{select, RotationMode, DEFAULT_MODE};

/// Default upstream method when `method` is absent or empty
pub const DEFAULT_METHOD: &str = "GET";

/// Query parameters accepted by the proxy endpoint
#[derive(Debug, Default)]
pub struct ProxyQuery {
    /// `round` (default) or `random`
    pub mode: Option<String>,
    /// Caller-managed rotation index for `round` mode
    pub index: Option<String>,
    /// Upstream HTTP method
    pub method: Option<String>,
}

impl ProxyQuery {
    /// Build from raw query pairs; the first occurrence of a name wins
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "mode" => &mut query.mode,
                "index" => &mut query.index,
                "method" => &mut query.method,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

/// Per-request rotation inputs
#[derive(Debug, Clone)]
pub struct RotationRequest {
    /// Mode as the caller sent it, echoed in metadata
    pub requested_mode: String,
    pub mode: RotationMode,
    /// Method as the caller sent it, echoed in metadata
    pub method: String,
}

impl From<ProxyQuery> for RotationRequest {
    fn from(query: ProxyQuery) -> Self {
        let mode = RotationMode::from_query(query.mode.as_deref(), query.index.as_deref());
        Self {
            requested_mode: query
                .mode
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MODE.to_string()),
            mode,
            method: query
                .method
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_METHOD.to_string()),
        }
    }
}

/// Forward a request using a rotated upstream key
///
/// ANY /api/proxy
pub async fn proxy(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SuccessEnvelope>, ApiError> {
    let pool = state.key_pool()?;
    let rotation = RotationRequest::from(ProxyQuery::from_pairs(pairs));
    let credential = select(&pool, rotation.mode, state.random.as_ref());

    let context = EnvelopeContext {
        upstream_url: state.upstream.url().to_string(),
        method: rotation.method.clone(),
        rotation_mode: rotation.requested_mode.clone(),
    };

    tracing::info!(
        mode = %rotation.mode,
        key = %credential,
        pool_size = pool.len(),
        method = %rotation.method,
        "Forwarding request upstream"
    );

    match state.upstream.forward(credential, &rotation.method).await {
        Ok(response) => Ok(Json(build_success(response, &context, credential, pool.len()))),
        Err(source) => Err(ApiError::Upstream {
            source,
            metadata: build_error_metadata(&context),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_request_defaults() {
        let rotation = RotationRequest::from(ProxyQuery::default());
        assert_eq!(rotation.requested_mode, "round");
        assert_eq!(rotation.mode, RotationMode::RoundRobin { index: 0 });
        assert_eq!(rotation.method, "GET");
    }

    #[test]
    fn test_rotation_request_echoes_caller_values() {
        let rotation = RotationRequest::from(ProxyQuery {
            mode: Some("sequential".to_string()),
            index: Some("abc".to_string()),
            method: Some("post".to_string()),
        });
        assert_eq!(rotation.requested_mode, "sequential");
        assert_eq!(rotation.mode, RotationMode::RoundRobin { index: 0 });
        assert_eq!(rotation.method, "post");
    }

    #[test]
    fn test_rotation_request_empty_values_take_defaults() {
        let rotation = RotationRequest::from(ProxyQuery {
            mode: Some(String::new()),
            index: Some(String::new()),
            method: Some(String::new()),
        });
        assert_eq!(rotation.requested_mode, "round");
        assert_eq!(rotation.mode, RotationMode::RoundRobin { index: 0 });
        assert_eq!(rotation.method, "GET");
    }

    #[test]
    fn test_query_first_occurrence_wins() {
        let pairs = vec![
            ("index".to_string(), "2".to_string()),
            ("index".to_string(), "9".to_string()),
            ("other".to_string(), "x".to_string()),
            ("mode".to_string(), "round".to_string()),
        ];
        let query = ProxyQuery::from_pairs(pairs);
        assert_eq!(query.index.as_deref(), Some("2"));
        assert_eq!(query.mode.as_deref(), Some("round"));
        assert!(query.method.is_none());
    }

    #[test]
    fn test_rotation_request_random() {
        let rotation = RotationRequest::from(ProxyQuery {
            mode: Some("random".to_string()),
            index: Some("5".to_string()),
            method: None,
        });
        assert_eq!(rotation.mode, RotationMode::Random);
    }
}
