//! "Remember this" tool: writes a fact into the long-term memory store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use hearth_core::types::MemoryCategory;
use hearth_memory::MemoryStore;

use crate::error::ToolError;
use crate::handler::{require_str, ToolHandler};

/// Stores a memory-worthy fact the model extracted from conversation.
pub struct RememberHandler {
    memory: Arc<MemoryStore>,
}

impl RememberHandler {
    pub fn new(memory: Arc<MemoryStore>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl ToolHandler for RememberHandler {
    fn name(&self) -> &'static str {
        "remember"
    }

    fn description(&self) -> &'static str {
        "Save a long-term fact about the user (preference, personal detail, or other fact)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The fact to remember, phrased as a standalone statement."
                },
                "category": {
                    "type": "string",
                    "enum": ["personal", "preference", "fact", "reminder_context"]
                },
                "subject": {
                    "type": "string",
                    "description": "Who or what the fact is about, if not the user."
                },
                "confidence": {
                    "type": "number",
                    "description": "How certain the fact is, 0.0 to 1.0."
                }
            },
            "required": ["content", "category"]
        })
    }

    async fn execute(&self, parameters: &serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let content = require_str(parameters, "content")?;
        let category = MemoryCategory::parse_or_fact(
            parameters
                .get("category")
                .and_then(|v| v.as_str())
                .unwrap_or("fact"),
        );
        let subject = parameters.get("subject").and_then(|v| v.as_str());
        let confidence = parameters
            .get("confidence")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.8);

        let record = self.memory.add(content, category, subject, confidence)?;
        info!(id = %record.id, "Memory stored via tool call");

        Ok(serde_json::json!({
            "stored": true,
            "id": record.id,
            "confidence": record.confidence,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> (RememberHandler, Arc<MemoryStore>) {
        let memory = Arc::new(MemoryStore::in_memory().unwrap());
        (RememberHandler::new(Arc::clone(&memory)), memory)
    }

    #[tokio::test]
    async fn test_remember_stores_record() {
        let (handler, memory) = handler();
        let out = handler
            .execute(&serde_json::json!({
                "content": "prefers green tea",
                "category": "preference",
                "confidence": 0.9
            }))
            .await
            .unwrap();
        assert_eq!(out["stored"], true);
        assert_eq!(memory.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remember_clamps_confidence() {
        let (handler, memory) = handler();
        handler
            .execute(&serde_json::json!({
                "content": "birthday is June 3",
                "category": "personal",
                "confidence": 1.5
            }))
            .await
            .unwrap();
        assert_eq!(memory.all().unwrap()[0].confidence, 1.0);
    }

    #[tokio::test]
    async fn test_remember_missing_content_fails() {
        let (handler, _) = handler();
        let err = handler
            .execute(&serde_json::json!({"category": "fact"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_remember_unknown_category_falls_back_to_fact() {
        let (handler, memory) = handler();
        handler
            .execute(&serde_json::json!({
                "content": "the roof leaks when it rains",
                "category": "weather"
            }))
            .await
            .unwrap();
        assert_eq!(
            memory.all().unwrap()[0].category,
            MemoryCategory::Fact
        );
    }
}
