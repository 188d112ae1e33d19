//! Pipeline outputs and the error payload.
//!
//! Every value here is immutable once built by the orchestrator and
//! serializes to the response shape callers see.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::emotion::Emotion;
use super::intent::RoutedIntent;
use super::style::{Level, Tone};
use crate::session::SessionId;
use crate::ScrivenerError;

// ============================================================================
// Stages
// ============================================================================

/// States of the pipeline state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Routing,
    Rewriting,
    Planning,
    Generating,
    MetricsCollection,
    Aggregation,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Routing => "routing",
            PipelineStage::Rewriting => "rewriting",
            PipelineStage::Planning => "planning",
            PipelineStage::Generating => "generating",
            PipelineStage::MetricsCollection => "metrics_collection",
            PipelineStage::Aggregation => "aggregation",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }
}

/// Output of a best-effort generative stage.
///
/// `fallback` holds the reason when the stage passed its input through
/// instead of using model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    pub text: String,
    pub fallback: Option<String>,
}

impl StageOutput {
    pub fn generated(text: String) -> Self {
        Self {
            text,
            fallback: None,
        }
    }

    pub fn passthrough(text: String, reason: impl Into<String>) -> Self {
        Self {
            text,
            fallback: Some(reason.into()),
        }
    }

    pub fn degraded(&self) -> bool {
        self.fallback.is_some()
    }
}

// ============================================================================
// Results
// ============================================================================

/// What changed during enhancement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Explanation {
    pub tone_applied: Tone,
    pub enhancement_level: Level,
    pub readability_change: f64,
    pub structural_change: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PipelineResult {
    Enhancement {
        enhanced_text: String,
        emotion: Emotion,
        drift_score: f64,
        consistency_score: f64,
        readability_before: f64,
        readability_after: f64,
        explanation: Explanation,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fallbacks: Vec<PipelineStage>,
    },
    ScriptGeneration {
        generated_text: String,
        emotion: Emotion,
        drift_score: f64,
        consistency_score: f64,
        readability: f64,
        plan_used: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fallbacks: Vec<PipelineStage>,
    },
}

impl PipelineResult {
    /// The produced text.
    pub fn text(&self) -> &str {
        match self {
            PipelineResult::Enhancement { enhanced_text, .. } => enhanced_text,
            PipelineResult::ScriptGeneration { generated_text, .. } => generated_text,
        }
    }

    pub fn emotion(&self) -> Emotion {
        match self {
            PipelineResult::Enhancement { emotion, .. }
            | PipelineResult::ScriptGeneration { emotion, .. } => *emotion,
        }
    }

    pub fn drift_score(&self) -> f64 {
        match self {
            PipelineResult::Enhancement { drift_score, .. }
            | PipelineResult::ScriptGeneration { drift_score, .. } => *drift_score,
        }
    }

    pub fn consistency_score(&self) -> f64 {
        match self {
            PipelineResult::Enhancement {
                consistency_score, ..
            }
            | PipelineResult::ScriptGeneration {
                consistency_score, ..
            } => *consistency_score,
        }
    }

    pub fn fallbacks(&self) -> &[PipelineStage] {
        match self {
            PipelineResult::Enhancement { fallbacks, .. }
            | PipelineResult::ScriptGeneration { fallbacks, .. } => fallbacks,
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            PipelineResult::Enhancement { .. } => "enhancement",
            PipelineResult::ScriptGeneration { .. } => "script_generation",
        }
    }
}

/// How the persistence layer should record the writer's paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParagraphRecord {
    pub session_id: SessionId,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub content: RecordContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordContent {
    /// Original input, enhanced text and the diff log.
    Enhancement {
        original_text: String,
        enhanced_text: String,
        explanation: Explanation,
        readability_before: f64,
        readability_after: f64,
    },
    /// Generated text only.
    Generation { content: String },
}

impl ParagraphRecord {
    /// Build the record matching `result`.
    pub fn for_result(session_id: SessionId, original_text: &str, result: &PipelineResult) -> Self {
        let content = match result {
            PipelineResult::Enhancement {
                enhanced_text,
                readability_before,
                readability_after,
                explanation,
                ..
            } => RecordContent::Enhancement {
                original_text: original_text.to_string(),
                enhanced_text: enhanced_text.clone(),
                explanation: explanation.clone(),
                readability_before: *readability_before,
                readability_after: *readability_after,
            },
            PipelineResult::ScriptGeneration { generated_text, .. } => RecordContent::Generation {
                content: generated_text.clone(),
            },
        };
        Self {
            session_id,
            recorded_at: Utc::now(),
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WriterResult {
    #[serde(flatten)]
    pub result: PipelineResult,
    pub intent: RoutedIntent,
    pub record: ParagraphRecord,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rejected before any stage ran.
    Validation,
    /// Routing failed; carries the raw model output when there was one.
    Intent,
    /// A required backend failed mid-pipeline.
    Fatal,
}

/// `{"error": ...}` response with no partial result fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorPayload {
    pub error: String,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl From<&ScrivenerError> for ErrorPayload {
    fn from(err: &ScrivenerError) -> Self {
        let (kind, raw_output) = match err {
            ScrivenerError::Validation(_) => (ErrorKind::Validation, None),
            ScrivenerError::IntentParse { raw_output, .. } => {
                (ErrorKind::Intent, Some(raw_output.clone()))
            }
            ScrivenerError::IntentUnavailable(_) => (ErrorKind::Intent, None),
            ScrivenerError::EmbeddingUnavailable(_)
            | ScrivenerError::Config(_)
            | ScrivenerError::Store(_)
            | ScrivenerError::Io(_) => (ErrorKind::Fatal, None),
        };
        Self {
            error: err.to_string(),
            kind,
            raw_output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::intent::{IntentDecision, IntentSource};
    use pretty_assertions::assert_eq;

    fn enhancement(fallbacks: Vec<PipelineStage>) -> PipelineResult {
        PipelineResult::Enhancement {
            enhanced_text: "The sky is blue.".into(),
            emotion: Emotion::Neutral,
            drift_score: 0.0,
            consistency_score: 1.0,
            readability_before: 118.18,
            readability_after: 118.18,
            explanation: Explanation {
                tone_applied: Tone::Formal,
                enhancement_level: Level::Medium,
                readability_change: 0.0,
                structural_change: "Refinement applied based on selected level.".into(),
            },
            fallbacks,
        }
    }

    #[test]
    fn test_enhancement_shape_omits_empty_fallbacks() {
        let value = serde_json::to_value(enhancement(vec![])).expect("serialize");
        assert_eq!(value["mode"], "enhancement");
        assert_eq!(value["emotion"], "neutral");
        assert_eq!(value["explanation"]["tone_applied"], "formal");
        assert!(value.get("fallbacks").is_none());
    }

    #[test]
    fn test_fallbacks_are_listed_when_present() {
        let value =
            serde_json::to_value(enhancement(vec![PipelineStage::Rewriting])).expect("serialize");
        assert_eq!(value["fallbacks"], serde_json::json!(["rewriting"]));
    }

    #[test]
    fn test_writer_result_flattens_pipeline_fields() {
        let result = enhancement(vec![]);
        let record = ParagraphRecord::for_result(42, "the sky is blue", &result);
        let writer = WriterResult {
            result,
            intent: RoutedIntent {
                decision: IntentDecision::fallback(),
                source: IntentSource::Default,
            },
            record,
        };
        let value = serde_json::to_value(&writer).expect("serialize");
        assert_eq!(value["mode"], "enhancement");
        assert_eq!(value["intent"]["task_type"], "content_enhancement");
        assert_eq!(value["intent"]["source"], "default");
        assert_eq!(value["record"]["kind"], "enhancement");
        assert_eq!(value["record"]["original_text"], "the sky is blue");
        assert_eq!(value["record"]["session_id"], 42);
    }

    #[test]
    fn test_generation_record_keeps_only_content() {
        let result = PipelineResult::ScriptGeneration {
            generated_text: "Once upon a time.".into(),
            emotion: Emotion::Joy,
            drift_score: 0.0,
            consistency_score: 1.0,
            readability: 100.0,
            plan_used: "- a beginning".into(),
            fallbacks: vec![],
        };
        let record = ParagraphRecord::for_result(7, "write a story", &result);
        assert_eq!(
            record.content,
            RecordContent::Generation {
                content: "Once upon a time.".into()
            }
        );
    }

    #[test]
    fn test_error_payload_kinds() {
        let parse = ScrivenerError::IntentParse {
            message: "not a JSON object".into(),
            raw_output: "Sure! Here you go".into(),
        };
        let payload = ErrorPayload::from(&parse);
        assert_eq!(payload.kind, ErrorKind::Intent);
        assert_eq!(payload.raw_output.as_deref(), Some("Sure! Here you go"));

        let fatal = ErrorPayload::from(&ScrivenerError::EmbeddingUnavailable("down".into()));
        assert_eq!(fatal.kind, ErrorKind::Fatal);
        let json = serde_json::to_value(&fatal).expect("serialize");
        assert!(json.get("raw_output").is_none());

        let invalid = ErrorPayload::from(&ScrivenerError::Validation("empty".into()));
        assert_eq!(invalid.kind, ErrorKind::Validation);
    }
}
