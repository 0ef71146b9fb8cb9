//! Middleware module
//!
//! Contains HTTP middleware for authentication, CORS, and request logging.

pub mod auth;
pub mod cors;
pub mod logging;

// Re-export commonly used items
pub use auth::{authenticate, require_public_key, AuthState, API_KEY_HEADER};
pub use cors::{preflight, with_cors};
pub use logging::{log_request, TraceId, REQUEST_ID_HEADER, TRACE_ID_HEADER};
