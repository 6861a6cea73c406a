//! Error type for tool handlers.

use hearth_core::error::HearthError;

/// Errors a tool handler may raise during execution.
///
/// These never escape the registry's `execute`; they are converted to
/// error-status tool results the model can recover from.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<hearth_memory::MemoryError> for ToolError {
    fn from(err: hearth_memory::MemoryError) -> Self {
        ToolError::ExecutionFailed(err.to_string())
    }
}

impl From<ToolError> for HearthError {
    fn from(err: ToolError) -> Self {
        HearthError::Tool(err.to_string())
    }
}
