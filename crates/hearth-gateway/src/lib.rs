//! Model gateway: adapts the orchestrator's message/tool schema to the
//! language-model provider's wire protocol.
//!
//! The orchestrator talks to the `ModelBackend` trait only; the concrete
//! `AnthropicBackend` handles wire serialization, bounded retries, and
//! timeouts. Tests swap in `MockBackend`.

pub mod anthropic;
pub mod error;
pub mod mock;

use async_trait::async_trait;

use hearth_core::types::{Message, ToolCall};

pub use anthropic::AnthropicBackend;
pub use error::GatewayError;
pub use mock::MockBackend;

/// One completion request: full session history plus optional tool schemas.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System context (persona, memory facts, client context).
    pub system: Option<String>,
    /// Ordered session history, replayed verbatim.
    pub messages: Vec<Message>,
    /// Tool schemas to offer, empty when tools are withheld.
    pub tools: Vec<serde_json::Value>,
}

/// The model's reply: text content and at most one tool call.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub tool_call: Option<ToolCall>,
}

impl CompletionResponse {
    /// A plain text reply with no tool call.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_call: None,
        }
    }

    /// A reply requesting a tool invocation.
    pub fn tool(content: impl Into<String>, call: ToolCall) -> Self {
        Self {
            content: content.into(),
            tool_call: Some(call),
        }
    }
}

/// A language-model backend capable of tool-calling completions.
///
/// Implementations must preserve message ordering losslessly when
/// serializing to the provider wire format.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest)
        -> Result<CompletionResponse, GatewayError>;
}
