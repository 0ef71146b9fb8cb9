//! API endpoint handlers module
//!
//! Contains all HTTP endpoint handler implementations.

pub mod diagnostics;
pub mod health;
pub mod proxy;
