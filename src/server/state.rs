//! Application state container
//!
//! This module defines the shared application state that is passed
//! to all request handlers via Axum's state extraction. Nothing in it is
//! mutated after startup.

use crate::config::Settings;
use crate::services::{KeyPool, RandomSource, ThreadRandom, UpstreamClient};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Client for the fixed upstream target
    pub upstream: Arc<UpstreamClient>,

    /// Random source for `mode=random`
    pub random: Arc<dyn RandomSource>,

    /// Application start time (for uptime calculation)
    pub start_time: Instant,
}

impl AppState {
    /// Create application state with the production random source
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        Self::with_random(settings, Arc::new(ThreadRandom))
    }

    /// Create application state with an injected random source
    pub fn with_random(settings: Settings, random: Arc<dyn RandomSource>) -> anyhow::Result<Self> {
        let upstream = UpstreamClient::new(&settings.upstream)?;

        tracing::debug!(
            upstream_url = %upstream.url(),
            timeout_ms = upstream.timeout().as_millis() as u64,
            "Initialized upstream client"
        );

        Ok(Self {
            settings: Arc::new(settings),
            upstream: Arc::new(upstream),
            random,
            start_time: Instant::now(),
        })
    }

    /// Get the application uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Parse the configured key pool
    pub fn key_pool(&self) -> Result<KeyPool, crate::services::ConfigurationError> {
        KeyPool::parse(self.settings.api_keys.as_deref())
    }
}
