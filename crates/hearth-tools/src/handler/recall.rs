//! Memory recall tool: searches the long-term store.

use std::sync::Arc;

use async_trait::async_trait;

use hearth_memory::MemoryStore;

use crate::error::ToolError;
use crate::handler::{require_str, ToolHandler};

/// Searches stored memories by substring match on content or subject.
pub struct RecallHandler {
    memory: Arc<MemoryStore>,
}

impl RecallHandler {
    pub fn new(memory: Arc<MemoryStore>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl ToolHandler for RecallHandler {
    fn name(&self) -> &'static str {
        "recall_memories"
    }

    fn description(&self) -> &'static str {
        "Search the user's stored long-term memories by keyword."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Keyword or phrase to search for."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, parameters: &serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let query = require_str(parameters, "query")?;
        let hits = self.memory.search(query)?;
        let memories: Vec<serde_json::Value> = hits
            .iter()
            .map(|r| {
                serde_json::json!({
                    "content": r.content,
                    "category": r.category.as_str(),
                    "subject": r.subject,
                    "confidence": r.confidence,
                })
            })
            .collect();
        Ok(serde_json::json!({ "memories": memories, "count": memories.len() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::types::MemoryCategory;

    #[tokio::test]
    async fn test_recall_finds_matching_memories() {
        let memory = Arc::new(MemoryStore::in_memory().unwrap());
        memory
            .add("prefers green tea", MemoryCategory::Preference, None, 0.9)
            .unwrap();
        memory
            .add("drives a red car", MemoryCategory::Fact, None, 0.9)
            .unwrap();

        let handler = RecallHandler::new(memory);
        let out = handler
            .execute(&serde_json::json!({"query": "tea"}))
            .await
            .unwrap();
        assert_eq!(out["count"], 1);
        assert!(out["memories"][0]["content"]
            .as_str()
            .unwrap()
            .contains("tea"));
    }

    #[tokio::test]
    async fn test_recall_empty_query_fails() {
        let memory = Arc::new(MemoryStore::in_memory().unwrap());
        let handler = RecallHandler::new(memory);
        let err = handler
            .execute(&serde_json::json!({"query": ""}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters(_)));
    }
}
