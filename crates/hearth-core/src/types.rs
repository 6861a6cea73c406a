//! Shared domain types for conversation, tools, and long-term memory.
//!
//! These types are the vocabulary of the orchestration loop: ordered
//! session messages, model-issued tool calls, tool results fed back to the
//! model, and persistent memory records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A tool invocation requested by the model.
///
/// Ephemeral: lives only within one orchestration turn (or as the pending
/// remote request of a session awaiting a client-executed result).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_name: String,
    /// Arbitrary JSON parameters, keyed by parameter name.
    pub parameters: serde_json::Value,
    /// Provider-issued identifier used to correlate the result.
    pub call_id: String,
}

/// Outcome status of a tool execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

/// The result of executing a tool, locally or on the client.
///
/// Always echoes the originating `call_id` so the gateway can correlate it
/// with the tool call that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Accepts the provider's `tool_use_id` spelling on the wire.
    #[serde(alias = "tool_use_id")]
    pub call_id: String,
    pub tool_name: String,
    pub status: ToolStatus,
    pub data: serde_json::Value,
}

impl ToolResult {
    /// A successful result carrying `data`.
    pub fn success(call: &ToolCall, data: serde_json::Value) -> Self {
        Self {
            call_id: call.call_id.clone(),
            tool_name: call.tool_name.clone(),
            status: ToolStatus::Success,
            data,
        }
    }

    /// An error result carrying a message under the `error` key.
    pub fn error(call: &ToolCall, message: impl Into<String>) -> Self {
        Self {
            call_id: call.call_id.clone(),
            tool_name: call.tool_name.clone(),
            status: ToolStatus::Error,
            data: serde_json::json!({ "error": message.into() }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ToolStatus::Error
    }
}

/// One message in a conversation session.
///
/// Append-only and ordered; insertion order is replayed to the model
/// verbatim. Assistant messages that requested a tool carry the `tool_call`;
/// tool-role messages carry the `tool_call_id` of the call they answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            tool_call: None,
            tool_call_id: None,
        }
    }

    /// A plain user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// A final assistant answer.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// An assistant message that requested a tool invocation.
    ///
    /// `content` holds any preamble text the model emitted alongside the call.
    pub fn assistant_tool_call(content: impl Into<String>, call: ToolCall) -> Self {
        let mut msg = Self::new(Role::Assistant, content);
        msg.tool_call = Some(call);
        msg
    }

    /// A tool-role message carrying a tool result back to the model.
    pub fn tool_result(result: &ToolResult) -> Self {
        let mut msg = Self::new(
            Role::Tool,
            serde_json::to_string(&result.data).unwrap_or_default(),
        );
        msg.tool_call_id = Some(result.call_id.clone());
        msg
    }
}

/// Closed set of long-term memory categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    Personal,
    Preference,
    Fact,
    ReminderContext,
}

impl MemoryCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryCategory::Personal => "personal",
            MemoryCategory::Preference => "preference",
            MemoryCategory::Fact => "fact",
            MemoryCategory::ReminderContext => "reminder_context",
        }
    }

    /// Parse a category name; unknown names fall back to `Fact`.
    pub fn parse_or_fact(s: &str) -> Self {
        match s {
            "personal" => MemoryCategory::Personal,
            "preference" => MemoryCategory::Preference,
            "reminder_context" => MemoryCategory::ReminderContext,
            _ => MemoryCategory::Fact,
        }
    }
}

/// A persistent long-term memory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: Uuid,
    pub content: String,
    pub category: MemoryCategory,
    pub subject: Option<String>,
    /// Always within [0.0, 1.0].
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Create a record with `confidence` clamped to [0.0, 1.0].
    pub fn new(
        content: impl Into<String>,
        category: MemoryCategory,
        subject: Option<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            category,
            subject,
            confidence: clamp_confidence(confidence),
            created_at: Utc::now(),
        }
    }
}

/// Clamp a confidence value into [0.0, 1.0]. NaN maps to 0.0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Context the client attaches to a chat turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Capability names the client can execute (remote-delegated tools).
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}
