use crate::models::{ErrorKind, ErrorPayload};
use crate::ScrivenerError;
use rmcp::model::{Content, IntoContents};
use serde::Serialize;

/// Structured error response for MCP tool calls.
/// Provides error_code + suggestion so the calling agent can adjust.
#[derive(Debug, Serialize)]
pub struct ToolError {
    pub error_code: String,
    pub message: String,
    pub suggestion: String,
    /// Raw classifier output when intent parsing failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl IntoContents for ToolError {
    fn into_contents(self) -> Vec<Content> {
        let json = serde_json::to_string(&self).unwrap_or_else(|_| self.message.clone());
        vec![Content::text(json)]
    }
}

impl From<ScrivenerError> for ToolError {
    fn from(err: ScrivenerError) -> Self {
        let payload = ErrorPayload::from(&err);
        let (error_code, suggestion) = match (&err, payload.kind) {
            (_, ErrorKind::Validation) => (
                "VALIDATION_ERROR",
                "Check field values: level is low|medium|high, length is short|medium|long, mode is enhance|generate, targets are positive and bounded.",
            ),
            (ScrivenerError::IntentParse { .. }, _) => (
                "INTENT_PARSE_ERROR",
                "The classifier did not return a JSON decision. Call analyze or generate directly, or retry.",
            ),
            (_, ErrorKind::Intent) => (
                "INTENT_UNAVAILABLE",
                "The intent classifier could not be reached. Call analyze or generate directly, or retry later.",
            ),
            (ScrivenerError::EmbeddingUnavailable(_), _) => (
                "EMBEDDING_UNAVAILABLE",
                "The embedding model is not loaded; consistency cannot be scored. Check the [embedding] config.",
            ),
            _ => (
                "INTERNAL_ERROR",
                "Retry the operation or check the server logs.",
            ),
        };
        ToolError {
            error_code: error_code.into(),
            message: payload.error,
            suggestion: suggestion.into(),
            raw_output: payload.raw_output,
        }
    }
}
