//! The orchestration loop.
//!
//! One `respond` call is one turn: validate the utterance, replay the
//! session to the model with memory-enriched system context, execute any
//! requested tools (or hand a remote tool to the client), loop until the
//! model produces a final answer, then trim history and optionally
//! synthesize speech.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use hearth_core::config::ChatConfig;
use hearth_core::types::{ClientContext, Message, ToolCall, ToolResult};
use hearth_gateway::{CompletionRequest, ModelBackend};
use hearth_memory::MemoryStore;
use hearth_speech::SpeechSynthesizer;
use hearth_tools::ToolRegistry;

use crate::error::ChatError;
use crate::intent::ToolIntentClassifier;
use crate::session::{SessionLimits, SessionStore};

const DEFAULT_PERSONA: &str = "You are Hearth, a warm and concise personal voice assistant. \
Answer briefly in plain language and use the available tools when they help.";

/// Engine tuning knobs, usually derived from [`ChatConfig`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// System persona prepended to every completion request.
    pub persona: String,
    /// Hard cap on tool executions within one turn.
    pub max_tool_iterations: u32,
    /// Maximum user message length in characters.
    pub max_message_length: usize,
    /// How many recent memory records to inject into the system context.
    pub memory_inject_limit: usize,
    /// Per-session history bounds.
    pub limits: SessionLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            max_tool_iterations: 5,
            max_message_length: 4000,
            memory_inject_limit: 24,
            limits: SessionLimits::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_config(chat: &ChatConfig) -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            max_tool_iterations: chat.max_tool_iterations,
            max_message_length: chat.max_message_length,
            memory_inject_limit: chat.memory_inject_limit,
            limits: SessionLimits {
                max_messages: chat.max_history_messages,
                max_bytes: chat.max_history_bytes,
            },
        }
    }
}

/// Per-turn options supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct RespondOptions {
    /// Synthesize the reply to audio as well as text.
    pub include_audio: bool,
    /// Client-side context (location, device, capabilities).
    pub client_context: Option<ClientContext>,
    /// Result of a previously delegated remote tool call; resumes the
    /// interrupted turn instead of starting a fresh one.
    pub prior_tool_result: Option<ToolResult>,
}

/// Where the final reply text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    /// The model answered directly.
    Model,
    /// At least one tool result informed the answer.
    Tool,
}

/// The result of one completed (or suspended) turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub session_id: Uuid,
    pub text: String,
    /// Synthesized audio, when requested and available.
    pub audio: Option<Vec<u8>>,
    /// Set when the turn is suspended awaiting a client-executed tool.
    pub pending_tool: Option<ToolCall>,
    pub source: ReplySource,
}

/// Drives conversations end to end.
pub struct ChatEngine {
    backend: Arc<dyn ModelBackend>,
    tools: Arc<ToolRegistry>,
    memory: Arc<MemoryStore>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    sessions: SessionStore,
    classifier: ToolIntentClassifier,
    config: EngineConfig,
}

impl ChatEngine {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        tools: Arc<ToolRegistry>,
        memory: Arc<MemoryStore>,
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
        config: EngineConfig,
    ) -> Self {
        let sessions = SessionStore::new(config.limits.clone());
        Self {
            backend,
            tools,
            memory,
            synthesizer,
            sessions,
            classifier: ToolIntentClassifier::new(),
            config,
        }
    }

    /// Run one conversation turn.
    ///
    /// At most one turn may be in flight per session; a concurrent call
    /// fails fast with `SessionBusy`. On gateway failure the session keeps
    /// the user message but gains no partial assistant message.
    pub async fn respond(
        &self,
        session_id: Uuid,
        message: &str,
        options: RespondOptions,
    ) -> Result<TurnOutcome, ChatError> {
        let _guard = self.sessions.begin_turn(session_id)?;

        let resumed = if let Some(result) = &options.prior_tool_result {
            self.accept_tool_result(session_id, result)?;
            true
        } else {
            self.accept_user_message(session_id, message)?;
            false
        };

        let offer_tools = resumed || self.classifier.should_offer_tools(message);
        let tools = if offer_tools && !self.tools.is_empty() {
            self.tools.schemas()
        } else {
            Vec::new()
        };
        let system = self.system_context(options.client_context.as_ref());

        let mut used_tools = resumed;
        let mut iterations: u32 = 0;
        loop {
            let request = CompletionRequest {
                system: Some(system.clone()),
                messages: self.sessions.history(session_id)?,
                tools: tools.clone(),
            };
            let response = self.backend.complete(&request).await?;

            let Some(call) = response.tool_call else {
                // Final answer: commit, trim, optionally speak.
                self.sessions
                    .append(session_id, Message::assistant(response.content.clone()))?;
                self.sessions.trim(session_id)?;
                let audio = if options.include_audio {
                    self.synthesize(&response.content).await
                } else {
                    None
                };
                debug!(session = %session_id, used_tools, "Turn completed");
                return Ok(TurnOutcome {
                    session_id,
                    text: response.content,
                    audio,
                    pending_tool: None,
                    source: if used_tools {
                        ReplySource::Tool
                    } else {
                        ReplySource::Model
                    },
                });
            };

            if iterations >= self.config.max_tool_iterations {
                warn!(session = %session_id, tool = %call.tool_name, "Tool loop cap reached");
                return Err(ChatError::ToolLoopExceeded(self.config.max_tool_iterations));
            }
            iterations += 1;
            self.sessions.append(
                session_id,
                Message::assistant_tool_call(response.content.clone(), call.clone()),
            )?;

            if self.tools.is_remote(&call.tool_name) {
                // Suspend: the client executes this and resumes the turn
                // with the result.
                self.sessions.set_pending(session_id, call.clone())?;
                info!(session = %session_id, tool = %call.tool_name, "Delegated tool to client");
                // A suspended turn carries only the tool request; any
                // preamble stays in the history for replay.
                return Ok(TurnOutcome {
                    session_id,
                    text: String::new(),
                    audio: None,
                    pending_tool: Some(call),
                    source: ReplySource::Model,
                });
            }

            let result = self.tools.execute(&call).await;
            self.sessions
                .append(session_id, Message::tool_result(&result))?;
            used_tools = true;
        }
    }

    /// Validate and append a fresh user message, abandoning any pending
    /// remote tool call it supersedes.
    fn accept_user_message(&self, session_id: Uuid, message: &str) -> Result<(), ChatError> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if trimmed.chars().count() > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }

        if let Some(stale) = self.sessions.take_pending(session_id)? {
            warn!(
                session = %session_id,
                tool = %stale.tool_name,
                "Abandoning pending tool call superseded by a new message"
            );
            // Keep the call/result pairing intact for replay.
            let cancelled = ToolResult::error(&stale, "cancelled: superseded by a new user message");
            self.sessions
                .append(session_id, Message::tool_result(&cancelled))?;
        }

        self.sessions.append(session_id, Message::user(message))?;
        Ok(())
    }

    /// Accept a client-executed tool result, matching it against the
    /// session's pending call.
    fn accept_tool_result(&self, session_id: Uuid, result: &ToolResult) -> Result<(), ChatError> {
        match self.sessions.pending(session_id)? {
            Some(call) if call.call_id == result.call_id => {
                self.sessions.take_pending(session_id)?;
                self.sessions
                    .append(session_id, Message::tool_result(result))?;
                debug!(session = %session_id, tool = %result.tool_name, "Resuming delegated turn");
                Ok(())
            }
            _ => Err(ChatError::StaleToolResult(result.call_id.clone())),
        }
    }

    /// Persona, remembered facts, and client context for the model.
    fn system_context(&self, client: Option<&ClientContext>) -> String {
        let mut out = self.config.persona.clone();

        match self.memory.recent(self.config.memory_inject_limit) {
            Ok(records) if !records.is_empty() => {
                out.push_str("\n\nThings you know about the user:\n");
                for rec in records {
                    match &rec.subject {
                        Some(subject) => out.push_str(&format!(
                            "- [{}] {} ({})\n",
                            rec.category.as_str(),
                            rec.content,
                            subject
                        )),
                        None => out.push_str(&format!(
                            "- [{}] {}\n",
                            rec.category.as_str(),
                            rec.content
                        )),
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                // Memory is an enrichment; a read failure must not fail the turn.
                warn!(error = %e, "Memory lookup failed, continuing without facts");
            }
        }

        if let Some(ctx) = client {
            let mut lines = Vec::new();
            if let Some(location) = &ctx.location {
                lines.push(format!("Location: {}", location));
            }
            if let Some(timestamp) = &ctx.timestamp {
                lines.push(format!("Local time: {}", timestamp.to_rfc3339()));
            }
            if let Some(device) = &ctx.device {
                lines.push(format!("Device: {}", device));
            }
            if !ctx.capabilities.is_empty() {
                lines.push(format!("Client capabilities: {}", ctx.capabilities.join(", ")));
            }
            if !lines.is_empty() {
                out.push_str("\n\nClient context:\n");
                for line in lines {
                    out.push_str(&line);
                    out.push('\n');
                }
            }
        }

        out
    }

    /// Synthesize reply audio; failures degrade to text-only.
    async fn synthesize(&self, text: &str) -> Option<Vec<u8>> {
        let synth = self.synthesizer.as_ref()?;
        match synth.synthesize(text).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "Speech synthesis failed, replying text-only");
                None
            }
        }
    }

    // ---- Session passthroughs for the API layer ----

    pub fn history(&self, session_id: Uuid) -> Result<Vec<Message>, ChatError> {
        self.sessions.history(session_id)
    }

    pub fn clear_history(&self, session_id: Uuid) -> Result<(), ChatError> {
        self.sessions.clear(session_id)
    }

    pub fn seed_history(&self, session_id: Uuid, messages: Vec<Message>) -> Result<(), ChatError> {
        self.sessions.seed(session_id, messages)
    }

    pub fn pending_tool(&self, session_id: Uuid) -> Result<Option<ToolCall>, ChatError> {
        self.sessions.pending(session_id)
    }
}
