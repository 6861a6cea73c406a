//! HTTP API for the Hearth assistant.
//!
//! A small JSON surface over the chat engine, memory store, and speech
//! synthesizer, served with axum on localhost.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorBody};
pub use routes::{create_router, start_server};
pub use state::AppState;
