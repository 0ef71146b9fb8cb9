//! Wire schemas
//!
//! JSON documents returned by the proxy endpoint.

pub mod envelope;

pub use envelope::{
    build_error_metadata, build_success, timestamp_now, EnvelopeContext, ErrorEnvelope,
    ErrorMetadata, SuccessEnvelope, SuccessMetadata,
};
