//! Error types for Lumen operations.

use thiserror::Error;

use crate::data::DocId;

/// Main error type for Lumen operations.
#[derive(Error, Debug)]
pub enum LumenError {
    /// The requested document does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// A payload could not be turned into indexable text.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The id generator handed out an id that is already live.
    #[error("Duplicate document id: {0}")]
    DuplicateId(DocId),

    /// The id generator has no identifiers left to hand out.
    #[error("Document id space exhausted: {0}")]
    IdExhausted(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Lumen operations.
pub type Result<T> = std::result::Result<T, LumenError>;

impl LumenError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        LumenError::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        LumenError::InvalidInput(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        LumenError::InvalidConfig(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        LumenError::Internal(msg.into())
    }

    /// Check if repeating the same call can succeed without changing its input.
    ///
    /// A duplicate id only means the generator collided; the next attempt draws
    /// a fresh id.
    pub fn is_retriable(&self) -> bool {
        matches!(self, LumenError::DuplicateId(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LumenError::not_found("42");
        assert_eq!(err.to_string(), "Document not found: 42");

        let err = LumenError::DuplicateId(DocId::new(7));
        assert_eq!(err.to_string(), "Duplicate document id: 7");
    }

    #[test]
    fn test_retriable_errors() {
        assert!(LumenError::DuplicateId(DocId::new(1)).is_retriable());
        assert!(!LumenError::not_found("1").is_retriable());
        assert!(!LumenError::invalid_input("null payload").is_retriable());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: LumenError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, LumenError::Json(_)));
    }
}
