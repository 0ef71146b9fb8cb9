//! Timeout helpers
//!
//! The upstream call is bounded by a single deadline that covers both the
//! request and reading the body.

use std::time::Duration;

/// Apply timeout to an async operation
///
/// Returns `Err` with the original error type if the operation fails, or
/// [`TimeoutError::Timeout`] if the deadline passes first.
pub async fn with_timeout<T, E>(
    timeout: Duration,
    future: impl std::future::Future<Output = Result<T, E>>,
) -> Result<T, TimeoutError<E>> {
    match tokio::time::timeout(timeout, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(TimeoutError::Inner(err)),
        Err(_) => Err(TimeoutError::Timeout(timeout)),
    }
}

/// Error type for timeout operations
#[derive(Debug, thiserror::Error)]
pub enum TimeoutError<E> {
    #[error("timeout of {}ms exceeded", .0.as_millis())]
    Timeout(Duration),

    #[error(transparent)]
    Inner(E),
}
