//! Application state shared across all route handlers.
//!
//! AppState holds references to the chat engine and supporting services.
//! It is passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use hearth_chat::ChatEngine;
use hearth_memory::MemoryStore;
use hearth_speech::SpeechSynthesizer;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// The conversation orchestrator.
    pub engine: Arc<ChatEngine>,
    /// Long-term memory store.
    pub memory: Arc<MemoryStore>,
    /// Speech synthesizer, absent when synthesis is disabled.
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    /// Configured listen port, used for CORS origins.
    pub port: u16,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        engine: Arc<ChatEngine>,
        memory: Arc<MemoryStore>,
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
        port: u16,
    ) -> Self {
        Self {
            engine,
            memory,
            synthesizer,
            port,
            start_time: Instant::now(),
        }
    }
}
