//! Error type for the model gateway.

use hearth_core::error::HearthError;

/// Errors from the model gateway.
///
/// `Timeout` is distinct from `Unavailable` so the orchestrator can apply
/// different policy to the two if desired.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
    #[error("invalid request rejected by provider: {0}")]
    InvalidRequest(String),
    #[error("malformed provider response: {0}")]
    Response(String),
}

impl GatewayError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Unavailable(_))
    }
}

impl From<GatewayError> for HearthError {
    fn from(err: GatewayError) -> Self {
        HearthError::Gateway(err.to_string())
    }
}
