//! Route handler functions for all API endpoints.
//!
//! Each handler extracts query/path parameters via axum extractors,
//! interacts with AppState services, and returns JSON responses.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hearth_chat::{ReplySource, RespondOptions};
use hearth_core::types::{ClientContext, Message, MemoryRecord, Role, ToolCall, ToolResult};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user utterance. May be empty when `tool_result` resumes a turn.
    #[serde(default)]
    pub message: String,
    /// Target session; omitted means the default session.
    pub session_id: Option<Uuid>,
    /// Synthesize the reply to audio as well as text.
    #[serde(default)]
    pub include_audio: bool,
    /// Client-side context forwarded into the system prompt.
    pub client_context: Option<ClientContext>,
    /// Result of a previously delegated tool call.
    pub tool_result: Option<ToolResult>,
    /// Seed history for a brand-new session; ignored when the session
    /// already has messages.
    pub history: Option<Vec<SeedMessage>>,
}

/// A bare role/content pair for seeding a fresh session. Tool-role
/// entries are dropped: without call ids they cannot be replayed.
#[derive(Debug, Deserialize)]
pub struct SeedMessage {
    pub role: Role,
    pub content: String,
}

impl SeedMessage {
    fn into_message(self) -> Option<Message> {
        match self.role {
            Role::User => Some(Message::user(self.content)),
            Role::Assistant => Some(Message::assistant(self.content)),
            Role::Tool => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionParams {
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearRequest {
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct MemoriesParams {
    /// Optional substring filter over content and subject.
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    /// Final answer text; absent while a turn is suspended on a tool request.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub response: String,
    pub source: String,
    pub latency_ms: u64,
    /// Base64-encoded reply audio, when requested and available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Set when the turn is suspended awaiting a client-executed tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_request: Option<ToolRequest>,
}

/// A tool the client must execute and return via `tool_result`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ToolRequest {
    pub tool_name: String,
    pub parameters: serde_json::Value,
    pub tool_use_id: String,
}

impl From<ToolCall> for ToolRequest {
    fn from(call: ToolCall) -> Self {
        Self {
            tool_name: call.tool_name,
            parameters: call.parameters,
            tool_use_id: call.call_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub memory_count: usize,
    pub speech_enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemoriesResponse {
    pub memories: Vec<MemoryRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: Uuid,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearedResponse {
    pub status: String,
    pub session_id: Uuid,
}

fn default_session(id: Option<Uuid>) -> Uuid {
    id.unwrap_or(Uuid::nil())
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET /health - liveness plus basic service facts.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let memory_count = state.memory.count()?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        memory_count,
        speech_enabled: state.synthesizer.is_some(),
    }))
}

/// POST /chat - run one conversation turn.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let started = Instant::now();
    let session_id = default_session(req.session_id);

    if let Some(history) = req.history {
        let messages: Vec<Message> = history
            .into_iter()
            .filter_map(SeedMessage::into_message)
            .collect();
        state.engine.seed_history(session_id, messages)?;
    }

    let options = RespondOptions {
        include_audio: req.include_audio,
        client_context: req.client_context,
        prior_tool_result: req.tool_result,
    };
    let outcome = state.engine.respond(session_id, &req.message, options).await?;

    let audio = outcome
        .audio
        .map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes));
    Ok(Json(ChatResponse {
        session_id: outcome.session_id,
        response: outcome.text,
        source: match outcome.source {
            ReplySource::Model => "model".to_string(),
            ReplySource::Tool => "tool".to_string(),
        },
        latency_ms: started.elapsed().as_millis() as u64,
        audio,
        tool_request: outcome.pending_tool.map(ToolRequest::from),
    }))
}

/// GET /memories - list stored memories, optionally filtered.
pub async fn list_memories(
    State(state): State<AppState>,
    Query(params): Query<MemoriesParams>,
) -> Result<Json<MemoriesResponse>, ApiError> {
    let memories = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => state.memory.search(q)?,
        _ => match params.limit {
            Some(limit) => state.memory.recent(limit)?,
            None => state.memory.all()?,
        },
    };
    let total = memories.len();
    Ok(Json(MemoriesResponse { memories, total }))
}

/// DELETE /memories/{id} - forget one memory.
pub async fn delete_memory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    state.memory.delete(id)?;
    Ok(Json(DeletedResponse { deleted: id }))
}

/// GET /history - ordered session transcript.
pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<SessionParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let session_id = default_session(params.session_id);
    let messages = state.engine.history(session_id)?;
    Ok(Json(HistoryResponse {
        session_id,
        messages,
    }))
}

/// POST /history/clear - reset a session. Idempotent.
pub async fn clear_history(
    State(state): State<AppState>,
    req: Option<Json<ClearRequest>>,
) -> Result<Json<ClearedResponse>, ApiError> {
    let session_id = default_session(req.and_then(|Json(r)| r.session_id));
    state.engine.clear_history(session_id)?;
    Ok(Json(ClearedResponse {
        status: "cleared".to_string(),
        session_id,
    }))
}

/// POST /speak - synthesize arbitrary text without a chat turn.
///
/// Returns raw audio bytes, not JSON.
pub async fn speak(
    State(state): State<AppState>,
    Json(req): Json<SpeakRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Field 'text' must not be empty".to_string(),
        ));
    }
    let synth = state.synthesizer.as_ref().ok_or_else(|| {
        ApiError::SynthesisUnavailable("speech synthesis is disabled".to_string())
    })?;
    let bytes = synth.synthesize(&req.text).await?;
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], bytes))
}
