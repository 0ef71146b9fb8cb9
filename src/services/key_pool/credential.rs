//! Upstream credential type
//!
//! A credential is an opaque secret. Only its fingerprint (first eight
//! characters followed by `...`) is ever logged or returned to callers.

use std::fmt;

use crate::utils::truncate_str;

/// Number of leading characters exposed in a fingerprint
pub const FINGERPRINT_CHARS: usize = 8;

/// A single upstream API key
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    api_key: String,
}

impl Credential {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// The raw key, for building the outbound `Authorization` header only
    pub fn expose(&self) -> &str {
        &self.api_key
    }

    /// Partial key safe for logs and responses
    pub fn fingerprint(&self) -> String {
        format!("{}...", truncate_str(&self.api_key, FINGERPRINT_CHARS))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.fingerprint()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fingerprint())
    }
}
