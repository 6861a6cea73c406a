//! Current date/time tool.

use async_trait::async_trait;
use chrono::Local;

use crate::error::ToolError;
use crate::handler::ToolHandler;

/// Reports the server's current local date and time.
pub struct GetTimeHandler;

#[async_trait]
impl ToolHandler for GetTimeHandler {
    fn name(&self) -> &'static str {
        "get_time"
    }

    fn description(&self) -> &'static str {
        "Get the current local date and time on the home server."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _parameters: &serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let now = Local::now();
        Ok(serde_json::json!({
            "iso": now.to_rfc3339(),
            "readable": now.format("%A, %B %-d %Y, %H:%M").to_string(),
        }))
    }
}
