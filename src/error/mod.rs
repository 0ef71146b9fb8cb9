//! Error handling module

pub mod types;

pub use types::{ApiError, INTERNAL_ERROR_MESSAGE};
