//! Speech synthesis adapter.
//!
//! Wraps a remote TTS provider behind the `SpeechSynthesizer` trait. The
//! orchestrator treats synthesis failure as non-fatal: a reply degrades to
//! text-only instead of failing the turn.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use hearth_core::config::SpeechConfig;
use hearth_core::error::HearthError;

/// Errors from speech synthesis.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("synthesis unavailable: {0}")]
    Unavailable(String),
    #[error("synthesis failed: {0}")]
    Synthesis(String),
}

impl From<SpeechError> for HearthError {
    fn from(err: SpeechError) -> Self {
        HearthError::Speech(err.to_string())
    }
}

/// Turns reply text into audio bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}

#[derive(Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
}

/// Remote TTS adapter speaking the OpenAI-compatible audio endpoint.
pub struct RemoteSynthesizer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    voice: String,
    model: String,
}

impl RemoteSynthesizer {
    /// Build a synthesizer from configuration, reading the API key from the
    /// environment variable the config names.
    pub fn from_config(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            SpeechError::Unavailable(format!(
                "API key environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SpeechError::Unavailable(format!("HTTP client build failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            voice: config.voice.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for RemoteSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let url = format!("{}/v1/audio/speech", self.base_url);
        let body = TtsRequest {
            model: &self.model,
            voice: &self.voice,
            input: text,
        };

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SpeechError::Unavailable(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            return Err(SpeechError::Synthesis(format!("{}: {}", status, detail)));
        }

        let bytes = res
            .bytes()
            .await
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;
        debug!(bytes = bytes.len(), "Synthesized speech");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_error_display() {
        let err = SpeechError::Unavailable("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "synthesis unavailable: connection refused"
        );

        let err = SpeechError::Synthesis("bad voice".to_string());
        assert_eq!(err.to_string(), "synthesis failed: bad voice");
    }

    #[test]
    fn test_speech_error_into_hearth_error() {
        let err: HearthError = SpeechError::Unavailable("down".to_string()).into();
        assert!(matches!(err, HearthError::Speech(_)));
    }

    #[test]
    fn test_from_config_requires_api_key_env() {
        let config = SpeechConfig {
            api_key_env: "HEARTH_TEST_TTS_KEY_DEFINITELY_UNSET".to_string(),
            ..SpeechConfig::default()
        };
        let result = RemoteSynthesizer::from_config(&config);
        assert!(matches!(result, Err(SpeechError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_unavailable() {
        std::env::set_var("HEARTH_TEST_TTS_KEY_SET", "key");
        let config = SpeechConfig {
            api_key_env: "HEARTH_TEST_TTS_KEY_SET".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..SpeechConfig::default()
        };
        let synth = RemoteSynthesizer::from_config(&config).unwrap();
        let result = synth.synthesize("hello").await;
        assert!(matches!(result, Err(SpeechError::Unavailable(_))));
    }
}
