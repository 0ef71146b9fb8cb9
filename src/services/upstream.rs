//! Upstream forwarder
//!
//! Issues exactly one outbound request per proxied call, authenticated with
//! the selected credential. No retries and no caching: a failure is handed
//! straight back to the caller.

use reqwest::{header, Client, Method};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::services::key_pool::Credential;
use crate::utils::{with_timeout, TimeoutError};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when calling the upstream
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("timeout of {}ms exceeded", .0.as_millis())]
    Timeout(Duration),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Request failed with status code {0}")]
    Status(u16),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl UpstreamError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Timeout(_))
    }
}

impl From<TimeoutError<UpstreamError>> for UpstreamError {
    fn from(err: TimeoutError<UpstreamError>) -> Self {
        match err {
            TimeoutError::Timeout(after) => UpstreamError::Timeout(after),
            TimeoutError::Inner(inner) => inner,
        }
    }
}

// ============================================================================
// Upstream Response
// ============================================================================

/// A successful upstream exchange
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    /// Body parsed as JSON, or a JSON string when the body is not JSON
    pub data: Value,
}

// ============================================================================
// Upstream Client
// ============================================================================

/// Client for the single fixed upstream
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    url: String,
    user_agent: String,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        // The deadline is enforced per call by `with_timeout`
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
        })
    }

    /// The target every request is sent to
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward one request using `credential`
    ///
    /// `method` is the caller-supplied verb in any case; it is sent
    /// uppercased. Non-2xx statuses are errors.
    pub async fn forward(
        &self,
        credential: &Credential,
        method: &str,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let method = parse_method(method)?;

        tracing::debug!(
            url = %self.url,
            method = %method,
            credential = %credential,
            "Calling upstream"
        );

        let result = with_timeout(self.timeout, self.send(credential, method)).await;
        result.map_err(UpstreamError::from)
    }

    async fn send(
        &self,
        credential: &Credential,
        method: Method,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let response = self
            .client
            .request(method, &self.url)
            .header(header::AUTHORIZATION, format!("Bearer {}", credential.expose()))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let data = serde_json::from_str(&body).unwrap_or(Value::String(body));

        Ok(UpstreamResponse {
            status: status.as_u16(),
            data,
        })
    }
}

/// Normalize a caller-supplied method for the outbound request
fn parse_method(raw: &str) -> Result<Method, UpstreamError> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map_err(|_| UpstreamError::InvalidMethod(raw.to_string()))
}
