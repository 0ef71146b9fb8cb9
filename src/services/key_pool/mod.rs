//! Key Pool Module
//!
//! Parses the configured upstream credentials and picks one per request.
//!
//! # Example
//! ```
//! use multi_key_proxy::services::key_pool::{select, KeyPool, RotationMode, ThreadRandom};
//!
//! let pool = KeyPool::parse(Some("abc,def,ghi")).unwrap();
//! let mode = RotationMode::from_query(Some("round"), Some("1"));
//! assert_eq!(select(&pool, mode, &ThreadRandom).expose(), "def");
//! ```

mod credential;
mod pool;
mod strategy;

pub use credential::{Credential, FINGERPRINT_CHARS};
pub use pool::{ConfigurationError, KeyPool};
pub use strategy::{
    effective_index, parse_index, select, RandomSource, RotationMode, ThreadRandom, DEFAULT_MODE,
    RANDOM_MODE,
};
