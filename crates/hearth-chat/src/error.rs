//! Error types for the chat engine.

use hearth_core::error::HearthError;
use hearth_gateway::GatewayError;
use uuid::Uuid;

/// Errors from the orchestration loop.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session {0} already has a turn in flight")]
    SessionBusy(Uuid),
    #[error("stale tool result: no pending call matches {0}")]
    StaleToolResult(String),
    #[error("tool loop exceeded {0} iterations")]
    ToolLoopExceeded(u32),
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("upstream request timed out")]
    UpstreamTimeout,
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<GatewayError> for ChatError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Timeout => ChatError::UpstreamTimeout,
            other => ChatError::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<ChatError> for HearthError {
    fn from(err: ChatError) -> Self {
        HearthError::Chat(err.to_string())
    }
}
