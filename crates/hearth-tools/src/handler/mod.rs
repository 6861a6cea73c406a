//! Tool handler trait and local handler implementations.

pub mod recall;
pub mod remember;
pub mod time;

use async_trait::async_trait;

use crate::error::ToolError;

/// A locally executable tool the model can invoke.
///
/// Handlers return plain JSON data; the registry wraps it into a
/// `ToolResult` and converts any error into an error-status result.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Tool name as exposed to the model.
    fn name(&self) -> &'static str;

    /// One-line description for the tool schema.
    fn description(&self) -> &'static str;

    /// JSON schema of the tool's input parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given parameters.
    async fn execute(&self, parameters: &serde_json::Value) -> Result<serde_json::Value, ToolError>;
}

/// Extract a required string parameter.
pub(crate) fn require_str<'a>(
    parameters: &'a serde_json::Value,
    key: &str,
) -> Result<&'a str, ToolError> {
    parameters
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::InvalidParameters(format!("'{}' must be a non-empty string", key)))
}
