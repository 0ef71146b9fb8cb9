//! Response envelopes
//!
//! Every proxy response is exactly one of these JSON documents:
//! - success: `{success, data, metadata}`
//! - upstream failure: `{error, message, metadata}`
//! - gate failure: `{error, message}`
//! - unexpected failure: `{error, message, timestamp}`

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::{Credential, UpstreamResponse};

/// Current time as RFC 3339 UTC with millisecond precision
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Per-request facts shared by success and failure envelopes
#[derive(Debug, Clone)]
pub struct EnvelopeContext {
    pub upstream_url: String,
    pub method: String,
    pub rotation_mode: String,
}

/// Metadata attached to a successful proxy call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessMetadata {
    pub upstream_url: String,
    pub method: String,
    pub key_rotation_mode: String,
    /// Credential fingerprint, never the full key
    pub key_used: String,
    pub total_keys_available: usize,
    pub status_code: u16,
    pub timestamp: String,
}

/// Metadata attached to an upstream failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetadata {
    pub upstream_url: String,
    pub method: String,
    pub key_rotation_mode: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    pub success: bool,
    pub data: Value,
    pub metadata: SuccessMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ErrorMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            metadata: None,
            timestamp: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ErrorMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_timestamp(mut self) -> Self {
        self.timestamp = Some(timestamp_now());
        self
    }
}

/// Shape a successful upstream exchange
pub fn build_success(
    response: UpstreamResponse,
    context: &EnvelopeContext,
    credential: &Credential,
    pool_size: usize,
) -> SuccessEnvelope {
    SuccessEnvelope {
        success: true,
        data: response.data,
        metadata: SuccessMetadata {
            upstream_url: context.upstream_url.clone(),
            method: context.method.clone(),
            key_rotation_mode: context.rotation_mode.clone(),
            key_used: credential.fingerprint(),
            total_keys_available: pool_size,
            status_code: response.status,
            timestamp: timestamp_now(),
        },
    }
}

/// Metadata for an upstream failure envelope
pub fn build_error_metadata(context: &EnvelopeContext) -> ErrorMetadata {
    ErrorMetadata {
        upstream_url: context.upstream_url.clone(),
        method: context.method.clone(),
        key_rotation_mode: context.rotation_mode.clone(),
        timestamp: timestamp_now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> EnvelopeContext {
        EnvelopeContext {
            upstream_url: "https://upstream.test/todos/1".to_string(),
            method: "GET".to_string(),
            rotation_mode: "round".to_string(),
        }
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp_now();
        // e.g. 2024-05-01T12:34:56.789Z
        assert_eq!(ts.len(), 24);
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_build_success_shape() {
        let envelope = build_success(
            UpstreamResponse {
                status: 200,
                data: json!({"id": 1}),
            },
            &context(),
            &Credential::new("sk-abcdefghijkl"),
            3,
        );

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["id"], 1);
        assert_eq!(value["metadata"]["key_used"], "sk-abcde...");
        assert_eq!(value["metadata"]["total_keys_available"], 3);
        assert_eq!(value["metadata"]["status_code"], 200);
        assert_eq!(value["metadata"]["key_rotation_mode"], "round");
        assert_eq!(value["metadata"]["method"], "GET");
        assert_eq!(value["metadata"]["upstream_url"], "https://upstream.test/todos/1");
        assert!(!value.to_string().contains("sk-abcdefghijkl"));
    }

    #[test]
    fn test_error_envelope_omits_empty_fields() {
        let value = serde_json::to_value(ErrorEnvelope::new("Unauthorized", "nope")).unwrap();
        assert_eq!(value, json!({"error": "Unauthorized", "message": "nope"}));
    }

    #[test]
    fn test_error_envelope_with_metadata() {
        let envelope = ErrorEnvelope::new("Upstream API failed", "timeout of 10000ms exceeded")
            .with_metadata(build_error_metadata(&context()));
        let value = serde_json::to_value(&envelope).unwrap();
        let metadata = value["metadata"].as_object().unwrap();
        assert_eq!(metadata.len(), 4);
        assert!(metadata.contains_key("timestamp"));
        assert!(!metadata.contains_key("key_used"));
    }
}
