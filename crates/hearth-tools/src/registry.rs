//! Tool registry: local handlers and remote-delegation markers.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use hearth_core::types::{ToolCall, ToolResult};
use hearth_memory::MemoryStore;

use crate::handler::{recall::RecallHandler, remember::RememberHandler, time::GetTimeHandler};
use crate::handler::ToolHandler;

/// A tool that must be executed by the client (e.g. device location).
///
/// The registry only carries its schema; execution happens on the client
/// and the result comes back through the chat API.
#[derive(Debug, Clone)]
pub struct RemoteTool {
    pub name: String,
    pub description: String,
    pub parameters_schema: serde_json::Value,
}

/// Maps tool names to local handlers or remote-delegation markers.
#[derive(Default)]
pub struct ToolRegistry {
    local: HashMap<String, Arc<dyn ToolHandler>>,
    remote: HashMap<String, RemoteTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a locally executable handler.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        self.local.insert(handler.name().to_string(), handler);
    }

    /// Register a remote-delegated tool by schema only.
    pub fn register_remote(&mut self, tool: RemoteTool) {
        self.remote.insert(tool.name.clone(), tool);
    }

    /// Register the built-in local handlers and the standard set of
    /// client-side tools.
    pub fn register_defaults(&mut self, memory: Arc<MemoryStore>) {
        self.register(Arc::new(GetTimeHandler));
        self.register(Arc::new(RememberHandler::new(Arc::clone(&memory))));
        self.register(Arc::new(RecallHandler::new(memory)));

        // Tools that need capabilities only the client possesses.
        self.register_remote(RemoteTool {
            name: "get_location".to_string(),
            description: "Get the user's current location from their device.".to_string(),
            parameters_schema: serde_json::json!({
                "type": "object", "properties": {}, "required": []
            }),
        });
        self.register_remote(RemoteTool {
            name: "check_calendar".to_string(),
            description: "List the user's calendar events for a date range.".to_string(),
            parameters_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "start": {"type": "string", "description": "ISO 8601 start of range"},
                    "end": {"type": "string", "description": "ISO 8601 end of range"}
                },
                "required": ["start", "end"]
            }),
        });
        self.register_remote(RemoteTool {
            name: "create_reminder".to_string(),
            description: "Create a reminder in the user's device reminders app.".to_string(),
            parameters_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "due": {"type": "string", "description": "ISO 8601 due time, optional"}
                },
                "required": ["title"]
            }),
        });
    }

    /// Whether a tool must be delegated to the client.
    pub fn is_remote(&self, name: &str) -> bool {
        self.remote.contains_key(name)
    }

    /// Whether a tool is known at all (local or remote).
    pub fn is_known(&self, name: &str) -> bool {
        self.local.contains_key(name) || self.remote.contains_key(name)
    }

    /// Execute a local tool call.
    ///
    /// Never panics outward: handler failures and unknown tool names are
    /// converted to error-status results the model can recover from.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let Some(handler) = self.local.get(&call.tool_name) else {
            warn!(tool = %call.tool_name, "Unknown tool requested by model");
            return ToolResult::error(call, format!("unknown tool: {}", call.tool_name));
        };

        match handler.execute(&call.parameters).await {
            Ok(data) => ToolResult::success(call, data),
            Err(e) => {
                warn!(tool = %call.tool_name, error = %e, "Tool execution failed");
                ToolResult::error(call, e.to_string())
            }
        }
    }

    /// Tool schemas in provider format (name, description, input_schema),
    /// locals first, then remote-delegated tools.
    pub fn schemas(&self) -> Vec<serde_json::Value> {
        let mut out: Vec<serde_json::Value> = Vec::new();
        let mut locals: Vec<_> = self.local.values().collect();
        locals.sort_by_key(|h| h.name());
        for handler in locals {
            out.push(serde_json::json!({
                "name": handler.name(),
                "description": handler.description(),
                "input_schema": handler.parameters_schema(),
            }));
        }
        let mut remotes: Vec<_> = self.remote.values().collect();
        remotes.sort_by(|a, b| a.name.cmp(&b.name));
        for tool in remotes {
            out.push(serde_json::json!({
                "name": tool.name,
                "description": tool.description,
                "input_schema": tool.parameters_schema,
            }));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.remote.is_empty()
    }
}
