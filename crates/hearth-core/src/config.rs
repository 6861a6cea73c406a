use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{HearthError, Result};

/// Top-level configuration for the Hearth server.
///
/// Loaded from `~/.hearth/config.toml` by default. Each section corresponds
/// to one subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HearthConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl HearthConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HearthConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HearthError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite memory database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// HTTP API port, bound on loopback.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.hearth/data".to_string(),
            log_level: "info".to_string(),
            port: 8787,
        }
    }
}

/// Language-model backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the provider API.
    pub base_url: String,
    /// Model identifier sent to the provider.
    pub model: String,
    /// Environment variable holding the API key. The key itself never
    /// lives in the config file.
    pub api_key_env: String,
    /// Maximum tokens requested per completion.
    pub max_tokens: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum attempts per completion (1 = no retry).
    pub max_attempts: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "HEARTH_MODEL_API_KEY".to_string(),
            max_tokens: 1024,
            timeout_secs: 60,
            max_attempts: 3,
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Whether speech synthesis is available at all.
    pub enabled: bool,
    /// Base URL of the TTS provider (OpenAI-compatible audio endpoint).
    pub base_url: String,
    /// Environment variable holding the TTS API key.
    pub api_key_env: String,
    /// Voice identifier.
    pub voice: String,
    /// TTS model identifier.
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.openai.com".to_string(),
            api_key_env: "HEARTH_TTS_API_KEY".to_string(),
            voice: "alloy".to_string(),
            model: "tts-1".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Orchestration loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Hard cap on tool-loop iterations within one turn.
    pub max_tool_iterations: u32,
    /// Maximum messages kept per session before trimming.
    pub max_history_messages: usize,
    /// Maximum serialized history size in bytes before trimming.
    pub max_history_bytes: usize,
    /// Maximum user message length in characters.
    pub max_message_length: usize,
    /// How many memory records to inject into the system context.
    pub memory_inject_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: 5,
            max_history_messages: 60,
            max_history_bytes: 96 * 1024,
            max_message_length: 4000,
            memory_inject_limit: 24,
        }
    }
}

/// Memory store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Database file name inside the data directory.
    pub db_file: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_file: "memory.db".to_string(),
        }
    }
}
