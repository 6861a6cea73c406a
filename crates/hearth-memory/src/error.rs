//! Error type for the memory store.

use hearth_core::error::HearthError;
use uuid::Uuid;

/// Errors from the memory store.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("memory record not found: {0}")]
    NotFound(Uuid),
}

impl From<rusqlite::Error> for MemoryError {
    fn from(err: rusqlite::Error) -> Self {
        MemoryError::Storage(err.to_string())
    }
}

impl From<MemoryError> for HearthError {
    fn from(err: MemoryError) -> Self {
        HearthError::Memory(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_error_display() {
        let err = MemoryError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "storage error: disk full");

        let id = Uuid::nil();
        let err = MemoryError::NotFound(id);
        assert_eq!(
            err.to_string(),
            "memory record not found: 00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_memory_error_into_hearth_error() {
        let err: HearthError = MemoryError::Storage("locked".to_string()).into();
        assert!(matches!(err, HearthError::Memory(_)));
        assert!(err.to_string().contains("locked"));
    }
}
