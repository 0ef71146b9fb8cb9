//! Application settings and configuration
//!
//! This module provides configuration management for the application,
//! loading settings from environment variables with sensible defaults.
//! Settings are loaded once at startup and shared read-only with every
//! request handler.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;

/// Default upstream target
pub const DEFAULT_UPSTREAM_URL: &str = "https://jsonplaceholder.typicode.com/todos/1";

/// Default outbound user-agent
pub const DEFAULT_USER_AGENT: &str = "Multi-API-Key-Tool/1.0";

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[value(alias = "dev")]
    Development,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => anyhow::bail!("Invalid environment: {}. Expected: development, staging, or production", s),
        }
    }
}

/// Upstream target configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// The single URL every proxied request is forwarded to
    pub url: String,
    /// Deadline for the whole upstream exchange, in milliseconds
    pub timeout_ms: u64,
    /// User-Agent sent on outbound requests
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPSTREAM_URL.to_string(),
            timeout_ms: 10_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Main application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    // App settings
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub log_level: String,

    // Server settings
    pub host: String,
    pub port: u16,

    /// Shared secret callers present in `x-api-key`
    #[serde(skip_serializing)]
    pub public_api_key: Option<String>,

    /// Raw comma-separated upstream credential pool, parsed per request
    #[serde(skip_serializing)]
    pub api_keys: Option<String>,

    pub upstream: UpstreamConfig,
}

impl Settings {
    /// Read settings from environment variables
    ///
    /// Not validated here: CLI overrides are applied first, then the caller
    /// runs [`Settings::validate`].
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (ignored in production typically)
        dotenvy::dotenv().ok();

        Ok(Self {
            app_name: env_or_default("APP_NAME", "multi-key-proxy"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: env_or_default("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: env_or_default("LOG_LEVEL", "info"),

            host: env_or_default("HOST", "0.0.0.0"),
            port: env_or_default("PORT", "3000")
                .parse()
                .context("Invalid PORT value")?,

            public_api_key: env::var("PUBLIC_API_KEY").ok(),
            api_keys: env::var("API_KEYS").ok(),

            upstream: UpstreamConfig {
                url: env_or_default("UPSTREAM_URL", DEFAULT_UPSTREAM_URL),
                timeout_ms: env_or_default("UPSTREAM_TIMEOUT_MS", "10000")
                    .parse()
                    .context("Invalid UPSTREAM_TIMEOUT_MS value")?,
                user_agent: env_or_default("UPSTREAM_USER_AGENT", DEFAULT_USER_AGENT),
            },
        })
    }

    /// Validate settings
    ///
    /// Missing secrets are not fatal: the request gates report them to
    /// callers as 401 / configuration errors.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }

        if self.upstream.timeout_ms == 0 {
            anyhow::bail!("Upstream timeout must be > 0");
        }

        let url = reqwest::Url::parse(&self.upstream.url)
            .with_context(|| format!("Invalid UPSTREAM_URL: {}", self.upstream.url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("UPSTREAM_URL must use http or https, got {}", url.scheme());
        }

        if self.public_api_key.as_deref().map_or(true, str::is_empty) {
            if self.is_production() {
                tracing::error!("PUBLIC_API_KEY is not set; every proxy request will be rejected");
            } else {
                tracing::warn!("PUBLIC_API_KEY is not set; every proxy request will be rejected");
            }
        }

        if self.api_keys.as_deref().map_or(true, |s| s.trim().is_empty()) {
            tracing::warn!("API_KEYS is not set; proxy requests will fail with a configuration error");
        }

        Ok(())
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get the server address string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "multi-key-proxy".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: Environment::Development,
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_api_key: None,
            api_keys: None,
            upstream: UpstreamConfig::default(),
        }
    }
}

/// Helper function to get environment variable with default
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
