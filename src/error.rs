use thiserror::Error;

/// Custom error type for Scrivener operations.
#[derive(Debug, Error)]
pub enum ScrivenerError {
    /// Request parameters were rejected before any pipeline stage ran.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The embedding model could not produce a vector for the text.
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The intent classifier answered, but not with the expected JSON object.
    #[error("Intent parsing failed: {message}")]
    IntentParse { message: String, raw_output: String },

    /// The intent classifier backend is configured but did not answer.
    #[error("Intent classifier unavailable: {0}")]
    IntentUnavailable(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session store operation failed.
    #[error("Session store error: {0}")]
    Store(String),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl ScrivenerError {
    /// Whether the caller can retry with different input (as opposed to a
    /// backend outage that aborted the request).
    pub fn is_client_error(&self) -> bool {
        matches!(self, ScrivenerError::Validation(_))
    }
}

impl From<std::io::Error> for ScrivenerError {
    fn from(err: std::io::Error) -> Self {
        ScrivenerError::Io(err.to_string())
    }
}
