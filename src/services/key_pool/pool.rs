//! Key pool parsing
//!
//! The pool is rebuilt from the raw `API_KEYS` value on every request and
//! never mutated afterwards.

use super::credential::Credential;
use thiserror::Error;

/// Errors raised while building the pool from configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("API_KEYS not configured")]
    NotConfigured,

    #[error("No API keys configured")]
    Empty,
}

/// An ordered, non-empty list of upstream credentials
#[derive(Debug, Clone)]
pub struct KeyPool {
    credentials: Vec<Credential>,
}

impl KeyPool {
    /// Parse a comma-separated key list
    ///
    /// Elements are trimmed and blanks dropped. Fails when the raw value is
    /// absent or empty, or when nothing is left after filtering.
    pub fn parse(raw: Option<&str>) -> Result<Self, ConfigurationError> {
        let raw = match raw {
            Some(s) if !s.is_empty() => s,
            _ => return Err(ConfigurationError::NotConfigured),
        };

        let credentials: Vec<Credential> = raw
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(Credential::new)
            .collect();

        if credentials.is_empty() {
            return Err(ConfigurationError::Empty);
        }

        Ok(Self { credentials })
    }

    /// Number of credentials; always at least one
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Always false, kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.iter()
    }
}

impl std::ops::Index<usize> for KeyPool {
    type Output = Credential;

    fn index(&self, index: usize) -> &Credential {
        &self.credentials[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pool: &KeyPool) -> Vec<&str> {
        pool.iter().map(Credential::expose).collect()
    }

    #[test]
    fn test_parse_trims_and_filters() {
        let pool = KeyPool::parse(Some(" abc , def,,ghi , ")).unwrap();
        assert_eq!(keys(&pool), vec!["abc", "def", "ghi"]);
        assert_eq!(pool.len(), 3);
        assert!(!pool.is_empty());
    }

    #[test]
    fn test_parse_single_key() {
        let pool = KeyPool::parse(Some("only-key")).unwrap();
        assert_eq!(keys(&pool), vec!["only-key"]);
    }

    #[test]
    fn test_parse_missing() {
        assert_eq!(KeyPool::parse(None).unwrap_err(), ConfigurationError::NotConfigured);
        assert_eq!(KeyPool::parse(Some("")).unwrap_err(), ConfigurationError::NotConfigured);
    }

    #[test]
    fn test_parse_only_separators() {
        let err = KeyPool::parse(Some(" , ,, ")).unwrap_err();
        assert_eq!(err, ConfigurationError::Empty);
        assert_eq!(err.to_string(), "No API keys configured");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let raw = Some("k1,k2,k3");
        assert_eq!(keys(&KeyPool::parse(raw).unwrap()), keys(&KeyPool::parse(raw).unwrap()));
    }

    #[test]
    fn test_index_by_position() {
        let pool = KeyPool::parse(Some("a,b")).unwrap();
        assert_eq!(pool[0].expose(), "a");
        assert_eq!(pool[1].expose(), "b");
    }
}
