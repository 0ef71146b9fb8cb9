//! Service layer
//!
//! Key pool rotation, the upstream forwarder, and key bundle helpers.

pub mod bundle;
pub mod key_pool;
pub mod upstream;

pub use bundle::{extract_env_keys, merge_unique, parse_key_lines, BundleError, KeyBundle};
pub use key_pool::{
    select, ConfigurationError, Credential, KeyPool, RandomSource, RotationMode, ThreadRandom,
};
pub use upstream::{UpstreamClient, UpstreamError, UpstreamResponse};
