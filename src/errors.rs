//! Error types for raggate
//!
//! One error enum for every component. Transient failures (network, judge
//! output) are distinguished from fatal configuration and input errors so
//! the retry manager can decide what to repeat.

use thiserror::Error;

/// Main error type for evaluation, gating and monitoring
#[derive(Error, Debug)]
pub enum EvalError {
    /// Chat or embedding API returned an error response
    #[error("LLM API error: {0}")]
    LlmApiError(String),

    /// Judge answered, but no usable rubric object could be extracted
    #[error("Malformed judge output: {0}")]
    MalformedJudgeOutput(String),

    /// Every attempt failed; carries the last failure
    #[error("Gave up after {attempts} attempts: {last}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        last: Box<EvalError>,
    },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors (missing credentials, invalid thresholds)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Dataset file has the wrong shape
    #[error("Dataset error: {0}")]
    DatasetError(String),

    /// An input artifact held no rows
    #[error("No rows found in {0}")]
    EmptyInput(String),

    /// Vector index errors
    #[error("Index error: {0}")]
    IndexError(String),

    /// External tool (pdftotext) failures
    #[error("Tool error: {0}")]
    ToolError(String),

    /// Timeout errors
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

/// Result type alias for raggate operations
pub type Result<T> = std::result::Result<T, EvalError>;

impl From<qdrant_client::QdrantError> for EvalError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        EvalError::IndexError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = EvalError::EmptyInput("results.jsonl".to_string());
        assert!(err.to_string().contains("results.jsonl"));
    }

    #[test]
    fn test_retry_exhausted_keeps_last_error() {
        let err = EvalError::RetryExhausted {
            attempts: 3,
            last: Box::new(EvalError::MalformedJudgeOutput("no JSON object".to_string())),
        };
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("no JSON object"));
        assert!(err.source().is_some());
    }
}
