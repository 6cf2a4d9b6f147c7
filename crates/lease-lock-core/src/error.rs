//! Error types for lease lock operations.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during lock operations.
///
/// Contention (an unexpired lease held by someone else) is deliberately not
/// represented here: the store reports it as a non-error outcome and the
/// coordinator absorbs it by polling again. Everything in this enum
/// propagates to the caller.
#[derive(Error, Debug)]
pub enum LockError {
    /// Lock acquisition timed out.
    #[error("lock acquisition timed out after {0:?}")]
    Timeout(Duration),

    /// Lock operation was cancelled.
    #[error("lock operation was cancelled")]
    Cancelled,

    /// Invalid resource name (e.g. empty).
    #[error("invalid resource name: {0}")]
    InvalidName(String),

    /// Invalid lease duration (must be positive).
    #[error("invalid lease duration: {0:?}")]
    InvalidDuration(Duration),

    /// Transient store failure (throttling, request timeout, network).
    ///
    /// The coordinator retries these with backoff up to a bounded attempt
    /// budget before surfacing them.
    #[error("transient store error: {0}")]
    Transient(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Permanent store failure (bad credentials, missing table, validation).
    ///
    /// Never retried; aborts the acquisition immediately.
    #[error("permanent store error: {0}")]
    Permanent(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Schema provisioning failed.
    #[error("schema provisioning failed: {0}")]
    Schema(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LockError {
    /// Whether the acquisition loop may retry after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LockError::Transient(_))
    }
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;
