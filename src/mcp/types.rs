use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{
    AnalyzeRequest, GenerateRequest, Length, Level, PipelineResult, PipelineStage, Tone,
    WriterMode, WriterRequest, WriterResult, DEFAULT_GENRE,
};
use crate::services::TextStats;
use crate::session::SessionId;
use crate::ScrivenerError;

// ============================================================================
// Inputs
// ============================================================================

/// Enhance a paragraph.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeInput {
    /// Writing session the paragraph belongs to
    pub session_id: SessionId,
    /// Paragraph to enhance
    pub text: String,
    /// formal, academic, casual, storyteller, technical, persuasive, dark, or any free-form tone (default formal)
    #[serde(default)]
    pub tone: Option<String>,
    /// low, medium or high (default medium)
    #[serde(default)]
    pub level: Option<String>,
}

/// Plan and write a story.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerateInput {
    pub session_id: SessionId,
    /// Story idea
    pub prompt: String,
    /// Genre (default "general")
    #[serde(default)]
    pub genre: Option<String>,
    /// Tone (default storyteller)
    #[serde(default)]
    pub tone: Option<String>,
    /// short, medium or long (default medium)
    #[serde(default)]
    pub length: Option<String>,
    /// Approximate word count, 1-5000
    #[serde(default)]
    pub target_words: Option<u32>,
    /// Approximate sentence count, 1-500
    #[serde(default)]
    pub target_sentences: Option<u32>,
}

/// Free-form request routed by intent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WriterInput {
    pub session_id: SessionId,
    /// What the user asked for, e.g. "make this more formal: ..." or "write a story about ..."
    pub user_input: String,
    /// enhance or generate; used when the intent cannot be classified (default enhance)
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    /// Output language (default english)
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub target_words: Option<u32>,
    #[serde(default)]
    pub target_sentences: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TextMetricsInput {
    pub text: String,
}

fn parse_opt<T: std::str::FromStr<Err = ScrivenerError>>(
    value: Option<String>,
) -> Result<Option<T>, ScrivenerError> {
    value.as_deref().map(str::parse).transpose()
}

impl TryFrom<AnalyzeInput> for AnalyzeRequest {
    type Error = ScrivenerError;

    fn try_from(input: AnalyzeInput) -> Result<Self, Self::Error> {
        Ok(AnalyzeRequest {
            session_id: input.session_id,
            text: input.text,
            tone: input.tone.as_deref().map(Tone::parse).unwrap_or_default(),
            level: parse_opt::<Level>(input.level)?.unwrap_or_default(),
        })
    }
}

impl TryFrom<GenerateInput> for GenerateRequest {
    type Error = ScrivenerError;

    fn try_from(input: GenerateInput) -> Result<Self, Self::Error> {
        Ok(GenerateRequest {
            session_id: input.session_id,
            prompt: input.prompt,
            genre: input.genre.unwrap_or_else(|| DEFAULT_GENRE.to_string()),
            tone: input
                .tone
                .as_deref()
                .map(Tone::parse)
                .unwrap_or(Tone::Storyteller),
            length: parse_opt::<Length>(input.length)?.unwrap_or_default(),
            target_words: input.target_words,
            target_sentences: input.target_sentences,
        })
    }
}

impl TryFrom<WriterInput> for WriterRequest {
    type Error = ScrivenerError;

    fn try_from(input: WriterInput) -> Result<Self, Self::Error> {
        Ok(WriterRequest {
            session_id: input.session_id,
            user_input: input.user_input,
            mode: parse_opt::<WriterMode>(input.mode)?.unwrap_or_default(),
            tone: input.tone.as_deref().map(Tone::parse),
            level: parse_opt::<Level>(input.level)?,
            genre: input.genre,
            language: input.language,
            target_words: input.target_words,
            target_sentences: input.target_sentences,
        })
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Result of `analyze` or `generate`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PipelineResponse {
    pub result: PipelineResult,
    /// Notes for the caller, e.g. stages that passed input through
    #[serde(default)]
    pub hints: Vec<String>,
}

impl From<PipelineResult> for PipelineResponse {
    fn from(result: PipelineResult) -> Self {
        let hints = fallback_hints(result.fallbacks());
        Self { result, hints }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WriterResponse {
    pub result: WriterResult,
    #[serde(default)]
    pub hints: Vec<String>,
}

impl From<WriterResult> for WriterResponse {
    fn from(result: WriterResult) -> Self {
        let hints = fallback_hints(result.result.fallbacks());
        Self { result, hints }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TextMetricsResponse {
    pub stats: TextStats,
}

fn fallback_hints(stages: &[PipelineStage]) -> Vec<String> {
    stages
        .iter()
        .map(|stage| {
            format!(
                "{}: model unavailable, input passed through unchanged",
                stage.as_str()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_input_defaults() {
        let input: AnalyzeInput =
            serde_json::from_str(r#"{"session_id": 42, "text": "The sky is blue."}"#)
                .expect("parse");
        let request = AnalyzeRequest::try_from(input).expect("convert");
        assert_eq!(request, AnalyzeRequest::new(42, "The sky is blue."));
    }

    #[test]
    fn test_invalid_level_is_validation() {
        let input = AnalyzeInput {
            session_id: 1,
            text: "x".into(),
            tone: None,
            level: Some("maximum".into()),
        };
        let err = AnalyzeRequest::try_from(input).expect_err("level");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_writer_input_conversion() {
        let input: WriterInput = serde_json::from_str(
            r#"{"session_id": 5, "user_input": "write a ghost story", "mode": "generate", "language": "german"}"#,
        )
        .expect("parse");
        let request = WriterRequest::try_from(input).expect("convert");
        assert_eq!(request.mode, WriterMode::Generate);
        assert_eq!(
            request.routed_input(),
            "[OUTPUT IN GERMAN] write a ghost story"
        );
    }

    #[test]
    fn test_generate_input_defaults() {
        let input: GenerateInput =
            serde_json::from_str(r#"{"session_id": 2, "prompt": "a heist"}"#).expect("parse");
        let request = GenerateRequest::try_from(input).expect("convert");
        assert_eq!(request, GenerateRequest::new(2, "a heist"));
    }

    #[test]
    fn test_fallback_hints() {
        let hints = fallback_hints(&[PipelineStage::Planning, PipelineStage::Generating]);
        assert_eq!(hints.len(), 2);
        assert!(hints[0].starts_with("planning:"));
    }
}
