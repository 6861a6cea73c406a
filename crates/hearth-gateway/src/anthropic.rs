//! Anthropic-style Messages API backend.
//!
//! Serializes the session history to the provider wire format (internal
//! ids and timestamps are stripped; only role and content blocks are
//! forwarded), retries transient failures with bounded exponential
//! backoff, and surfaces timeouts distinctly from availability failures.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use hearth_core::config::ModelConfig;
use hearth_core::types::{Message, Role, ToolCall};

use crate::error::GatewayError;
use crate::{CompletionRequest, CompletionResponse, ModelBackend};

const MESSAGES_PATH: &str = "/v1/messages";
const API_VERSION: &str = "2023-06-01";
const BACKOFF_BASE_MS: u64 = 250;

// Provider wire format.

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<serde_json::Value>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

#[derive(Deserialize)]
struct WireResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct WireErrorBody {
    error: Option<WireErrorDetail>,
}

#[derive(Deserialize)]
struct WireErrorDetail {
    message: String,
}

/// Model gateway speaking the Anthropic Messages API.
pub struct AnthropicBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    max_attempts: u32,
}

impl AnthropicBackend {
    /// Build a backend from configuration, reading the API key from the
    /// environment variable the config names.
    pub fn from_config(config: &ModelConfig) -> Result<Self, GatewayError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            GatewayError::Unavailable(format!(
                "API key environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        Self::new(
            config.base_url.clone(),
            api_key,
            config.model.clone(),
            config.max_tokens,
            config.timeout_secs,
            config.max_attempts,
        )
    }

    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        max_tokens: u32,
        timeout_secs: u64,
        max_attempts: u32,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GatewayError::Unavailable(format!("HTTP client build failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            max_tokens,
            max_attempts: max_attempts.max(1),
        })
    }

    async fn attempt(&self, body: &WireRequest<'_>) -> Result<CompletionResponse, GatewayError> {
        let url = format!("{}{}", self.base_url, MESSAGES_PATH);
        let res = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Unavailable(e.to_string())
                }
            })?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<WireErrorBody>(&text)
                .ok()
                .and_then(|b| b.error)
                .map(|e| e.message)
                .unwrap_or(text);
            // 429 and 5xx are worth retrying; other 4xx are schema or
            // validation problems that will not improve.
            return if status.is_server_error() || status.as_u16() == 429 {
                Err(GatewayError::Unavailable(format!("{}: {}", status, detail)))
            } else {
                Err(GatewayError::InvalidRequest(format!("{}: {}", status, detail)))
            };
        }

        let parsed: WireResponse = res
            .json()
            .await
            .map_err(|e| GatewayError::Response(e.to_string()))?;
        Ok(decode_response(parsed))
    }
}

#[async_trait::async_trait]
impl ModelBackend for AnthropicBackend {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, GatewayError> {
        let body = WireRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: request.system.as_deref(),
            messages: encode_messages(&request.messages),
            tools: request.tools.clone(),
        };

        let mut last_err = GatewayError::Unavailable("no attempts made".to_string());
        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = Duration::from_millis(BACKOFF_BASE_MS * (1 << (attempt - 1)));
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying completion");
                tokio::time::sleep(delay).await;
            }
            match self.attempt(&body).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt + 1 < self.max_attempts => {
                    warn!(attempt, error = %e, "Transient completion failure");
                    last_err = e;
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err)
    }
}

/// Serialize session messages to wire messages, order preserved.
///
/// Tool-role messages become user-role `tool_result` blocks, matching the
/// provider's convention. Internal ids and timestamps are not forwarded.
fn encode_messages(messages: &[Message]) -> Vec<WireMessage> {
    messages
        .iter()
        .map(|msg| match msg.role {
            Role::User => WireMessage {
                role: "user",
                content: vec![ContentBlock::Text {
                    text: msg.content.clone(),
                }],
            },
            Role::Assistant => {
                let mut content = Vec::new();
                if !msg.content.is_empty() {
                    content.push(ContentBlock::Text {
                        text: msg.content.clone(),
                    });
                }
                if let Some(call) = &msg.tool_call {
                    content.push(ContentBlock::ToolUse {
                        id: call.call_id.clone(),
                        name: call.tool_name.clone(),
                        input: call.parameters.clone(),
                    });
                }
                WireMessage {
                    role: "assistant",
                    content,
                }
            }
            Role::Tool => WireMessage {
                role: "user",
                content: vec![ContentBlock::ToolResult {
                    tool_use_id: msg.tool_call_id.clone().unwrap_or_default(),
                    content: msg.content.clone(),
                }],
            },
        })
        .collect()
}

/// Extract reply text and the first tool-use block, if any.
fn decode_response(response: WireResponse) -> CompletionResponse {
    let mut text = String::new();
    let mut tool_call = None;
    for block in response.content {
        match block {
            ContentBlock::Text { text: t } => {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&t);
            }
            ContentBlock::ToolUse { id, name, input } if tool_call.is_none() => {
                tool_call = Some(ToolCall {
                    tool_name: name,
                    parameters: input,
                    call_id: id,
                });
            }
            _ => {}
        }
    }
    CompletionResponse { content: text, tool_call }
}
