//! Key bundles
//!
//! Merges raw API keys into one portable string: the standard base64
//! encoding of `{"keys": [...], "created": <unix seconds>}`. Also extracts
//! key values from `.env` style text.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors from building or decoding a bundle
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Please enter at least one API key")]
    NoKeys,

    #[error("Invalid base64 bundle: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid bundle JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A set of keys merged into a single value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBundle {
    pub keys: Vec<String>,
    /// Unix timestamp (seconds) the bundle was created
    pub created: i64,
}

impl KeyBundle {
    /// Create a bundle stamped with the current time
    pub fn new(keys: Vec<String>) -> Result<Self, BundleError> {
        Self::with_created(keys, chrono::Utc::now().timestamp())
    }

    pub fn with_created(keys: Vec<String>, created: i64) -> Result<Self, BundleError> {
        if keys.is_empty() {
            return Err(BundleError::NoKeys);
        }
        Ok(Self { keys, created })
    }

    /// Base64 of the compact JSON form
    pub fn encode(&self) -> Result<String, BundleError> {
        let json = serde_json::to_string(self)?;
        Ok(STANDARD.encode(json))
    }

    pub fn decode(encoded: &str) -> Result<Self, BundleError> {
        let bytes = STANDARD.decode(encoded.trim())?;
        let bundle: KeyBundle = serde_json::from_slice(&bytes)?;
        if bundle.keys.is_empty() {
            return Err(BundleError::NoKeys);
        }
        Ok(bundle)
    }
}

/// One key per line, trimmed, blanks dropped
pub fn parse_key_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collect values of every variable whose name contains `key`
///
/// Comment and blank lines are skipped. Values are split on commas so a
/// pooled `API_KEYS=a,b` line contributes both keys.
pub fn extract_env_keys(content: &str) -> Vec<String> {
    let mut keys = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((name, value)) = line.split_once('=') else {
            continue;
        };

        if name.trim().to_lowercase().contains("key") {
            keys.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string),
            );
        }
    }

    keys
}

/// Concatenate two key lists, keeping the first occurrence of each key
pub fn merge_unique(first: Vec<String>, second: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    first
        .into_iter()
        .chain(second)
        .filter(|key| seen.insert(key.clone()))
        .collect()
}
