//! Error types for gateway operations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Failure classes for a single generation call. Every failure is terminal
/// for the current invocation; none is retried and none aborts the process.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request rejected before any model call was made.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Inbound body was not valid JSON.
    #[error("malformed request body: {0}")]
    Parse(String),

    /// The inference endpoint was unreachable or rejected the call.
    #[error("model invocation failed: {0}")]
    Invocation(String),

    /// The inference endpoint call exceeded the configured deadline.
    #[error("model invocation timed out")]
    Timeout,

    /// The endpoint replied with a payload the model-family adapter cannot
    /// read.
    #[error("unexpected response shape from model provider: {0}")]
    ResponseShape(String),

    /// Deployment configuration was missing or invalid at cold start.
    #[error("configuration error: {0}")]
    Config(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// True for failures caused by the caller rather than the gateway or the
    /// model endpoint.
    pub fn is_client_error(&self) -> bool {
        matches!(self, GatewayError::Validation(_) | GatewayError::Parse(_))
    }
}
