// Error taxonomy. Every variant ends up as an UNKNOWN plugin result.

use crate::rate::RateError;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Timeout, refused connection, TLS failure.
    #[error("network error: {0}")]
    Network(String),

    /// Appliance answered, but with a non-2xx status or `status="error"`.
    #[error("appliance rejected request: {0}")]
    ApiRejected(String),

    /// Body is not XML or lacks an expected element.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Rate(#[from] RateError),

    #[error("counter store: {0}")]
    Store(String),

    #[error("timed out after {0:?} waiting for counter store lock")]
    LockTimeout(Duration),

    #[error("invalid arguments: {0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
