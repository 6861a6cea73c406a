//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints, mapping internal errors to appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use hearth_chat::ChatError;
use hearth_memory::MemoryError;
use hearth_speech::SpeechError;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "session_busy").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 404 Not Found - resource does not exist.
    NotFound(String),
    /// 409 Conflict - a turn is already in flight on the session.
    SessionBusy(String),
    /// 409 Conflict - tool result does not match the pending call.
    StaleToolResult(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
    /// 502 Bad Gateway - the model provider failed.
    Upstream(String),
    /// 503 Service Unavailable - speech synthesis not available.
    SynthesisUnavailable(String),
    /// 504 Gateway Timeout - the model provider timed out.
    UpstreamTimeout(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::SessionBusy(msg) => (StatusCode::CONFLICT, "session_busy", msg),
            ApiError::StaleToolResult(msg) => (StatusCode::CONFLICT, "stale_tool_result", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg),
            ApiError::SynthesisUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "synthesis_unavailable", msg)
            }
            ApiError::UpstreamTimeout(msg) => {
                (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        let msg = err.to_string();
        match err {
            ChatError::EmptyMessage | ChatError::MessageTooLong(_) => ApiError::BadRequest(msg),
            ChatError::SessionBusy(_) => ApiError::SessionBusy(msg),
            ChatError::StaleToolResult(_) => ApiError::StaleToolResult(msg),
            ChatError::ToolLoopExceeded(_) | ChatError::UpstreamUnavailable(_) => {
                ApiError::Upstream(msg)
            }
            ChatError::UpstreamTimeout => ApiError::UpstreamTimeout(msg),
            ChatError::Storage(_) => ApiError::Internal(msg),
        }
    }
}

impl From<MemoryError> for ApiError {
    fn from(err: MemoryError) -> Self {
        match &err {
            MemoryError::NotFound(_) => ApiError::NotFound(err.to_string()),
            MemoryError::Storage(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<SpeechError> for ApiError {
    fn from(err: SpeechError) -> Self {
        ApiError::SynthesisUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: ApiError = ChatError::EmptyMessage.into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_busy_maps_to_conflict() {
        let err: ApiError = ChatError::SessionBusy(Uuid::nil()).into();
        assert!(matches!(err, ApiError::SessionBusy(_)));
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let err: ApiError = ChatError::UpstreamTimeout.into();
        assert!(matches!(err, ApiError::UpstreamTimeout(_)));
    }

    #[test]
    fn test_loop_cap_maps_to_upstream() {
        let err: ApiError = ChatError::ToolLoopExceeded(5).into();
        assert!(matches!(err, ApiError::Upstream(_)));
    }

    #[test]
    fn test_memory_not_found_maps_to_404() {
        let err: ApiError = MemoryError::NotFound(Uuid::nil()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
