//! Hearth application binary - composition root.
//!
//! Ties together all Hearth crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Open the SQLite memory store
//! 3. Register tool handlers (local and client-delegated)
//! 4. Build the model gateway and optional speech synthesizer
//! 5. Start the axum REST API server

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use hearth_api::{routes, AppState};
use hearth_chat::{ChatEngine, EngineConfig};
use hearth_core::config::HearthConfig;
use hearth_gateway::AnthropicBackend;
use hearth_memory::MemoryStore;
use hearth_speech::{RemoteSynthesizer, SpeechSynthesizer};
use hearth_tools::ToolRegistry;

use cli::CliArgs;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Tracing.
    let default_filter = args.resolve_log_level().unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!("Starting Hearth v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = HearthConfig::load_or_default(&config_file);
    tracing::info!(path = %config_file.display(), "Configuration loaded");
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    let port = args.resolve_port(config.general.port);

    // Memory store.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let db_path = data_dir.join(&config.memory.db_file);
    let memory = Arc::new(MemoryStore::open(&db_path)?);
    tracing::info!(path = %db_path.display(), "Memory store opened");

    // Tools.
    let mut registry = ToolRegistry::new();
    registry.register_defaults(Arc::clone(&memory));
    let registry = Arc::new(registry);

    // Model gateway.
    let backend = Arc::new(AnthropicBackend::from_config(&config.model)?);
    tracing::info!(model = %config.model.model, "Model gateway ready");

    // Speech synthesizer (optional).
    let synthesizer: Option<Arc<dyn SpeechSynthesizer>> = if config.speech.enabled {
        match RemoteSynthesizer::from_config(&config.speech) {
            Ok(synth) => {
                tracing::info!(voice = %config.speech.voice, "Speech synthesis enabled");
                Some(Arc::new(synth))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Speech synthesis unavailable, replies will be text-only");
                None
            }
        }
    } else {
        None
    };

    // Chat engine.
    let engine = Arc::new(ChatEngine::new(
        backend,
        registry,
        Arc::clone(&memory),
        synthesizer.clone(),
        EngineConfig::from_config(&config.chat),
    ));

    // API server.
    let state = AppState::new(engine, memory, synthesizer, port);
    routes::start_server(port, state).await?;

    Ok(())
}
