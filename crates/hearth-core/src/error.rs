use thiserror::Error;

/// Top-level error type for the Hearth system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for HearthError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HearthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Memory store error: {0}")]
    Memory(String),

    #[error("Model gateway error: {0}")]
    Gateway(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for HearthError {
    fn from(err: toml::de::Error) -> Self {
        HearthError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for HearthError {
    fn from(err: toml::ser::Error) -> Self {
        HearthError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for HearthError {
    fn from(err: serde_json::Error) -> Self {
        HearthError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Hearth operations.
pub type Result<T> = std::result::Result<T, HearthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HearthError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let hearth_err: HearthError = io_err.into();
        assert!(matches!(hearth_err, HearthError::Io(_)));
        assert!(hearth_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let err: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        assert!(err.is_err());
        let hearth_err: HearthError = err.unwrap_err().into();
        assert!(matches!(hearth_err, HearthError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        assert!(err.is_err());
        let hearth_err: HearthError = err.unwrap_err().into();
        assert!(matches!(hearth_err, HearthError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(HearthError, &str)> = vec![
            (
                HearthError::Memory("disk full".to_string()),
                "Memory store error: disk full",
            ),
            (
                HearthError::Gateway("connection refused".to_string()),
                "Model gateway error: connection refused",
            ),
            (
                HearthError::Tool("bad parameters".to_string()),
                "Tool error: bad parameters",
            ),
            (
                HearthError::Speech("provider down".to_string()),
                "Speech synthesis error: provider down",
            ),
            (
                HearthError::Chat("session busy".to_string()),
                "Chat error: session busy",
            ),
            (
                HearthError::Api("bind failed".to_string()),
                "API error: bind failed",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }
}
