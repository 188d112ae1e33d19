//! Intent routing for free-form writer input.
//!
//! The classifier must answer with a bare JSON object. Parsing is fail-closed:
//! prose around the object, an unknown `task_type` or unexpected keys are all
//! [`ScrivenerError::IntentParse`] carrying the raw model output.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm::{LlmClient, LlmError, LlmRequest};
use crate::models::{IntentDecision, IntentSource, Length, Level, Tone, DEFAULT_GENRE};
use crate::utils::text::truncate_for_log;
use crate::ScrivenerError;

const SYSTEM_PROMPT: &str = "Strict JSON intent classifier.";

pub(crate) fn intent_prompt(input: &str) -> String {
    format!(
        r#"You are an AI intent classification system.

You MUST return ONLY valid JSON.
No explanation.
No markdown.
No extra text.

If the user wants to:
- improve or rewrite text → content_enhancement
- create or generate a story/script → script_generation

Return JSON in one of these formats:

For enhancement:
{{"task_type": "content_enhancement", "tone": "formal", "level": "medium"}}

For script generation:
{{"task_type": "script_generation", "genre": "fantasy", "tone": "storyteller", "length": "medium"}}

User Input:
{input}"#
    )
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EnhancementParams {
    #[serde(default)]
    tone: Tone,
    #[serde(default)]
    level: Level,
}

fn default_genre() -> String {
    DEFAULT_GENRE.to_string()
}

fn default_story_tone() -> Tone {
    Tone::Storyteller
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptParams {
    #[serde(default = "default_genre")]
    genre: String,
    #[serde(default = "default_story_tone")]
    tone: Tone,
    #[serde(default)]
    length: Length,
}

/// Parse classifier output into a decision.
pub fn parse_intent(raw: &str) -> Result<IntentDecision, ScrivenerError> {
    let fail = |message: String| ScrivenerError::IntentParse {
        message,
        raw_output: raw.to_string(),
    };

    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|e| fail(format!("invalid JSON: {e}")))?;
    let Value::Object(mut map) = value else {
        return Err(fail("expected a JSON object".to_string()));
    };

    let task_type = match map.remove("task_type") {
        Some(Value::String(task_type)) => task_type,
        Some(_) => return Err(fail("task_type must be a string".to_string())),
        None => return Err(fail("missing task_type".to_string())),
    };

    match task_type.as_str() {
        "content_enhancement" => {
            let params: EnhancementParams = serde_json::from_value(Value::Object(map))
                .map_err(|e| fail(format!("invalid enhancement parameters: {e}")))?;
            Ok(IntentDecision::ContentEnhancement {
                tone: params.tone,
                level: params.level,
            })
        }
        "script_generation" => {
            let params: ScriptParams = serde_json::from_value(Value::Object(map))
                .map_err(|e| fail(format!("invalid script parameters: {e}")))?;
            Ok(IntentDecision::ScriptGeneration {
                genre: params.genre,
                tone: params.tone,
                length: params.length,
            })
        }
        other => Err(fail(format!("unknown task_type '{other}'"))),
    }
}

pub struct IntentClassifier {
    client: Arc<dyn LlmClient>,
}

impl IntentClassifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Classify `input`.
    ///
    /// Without credentials this returns the deterministic default
    /// (`content_enhancement`, formal, medium) tagged [`IntentSource::Default`].
    /// A configured backend that fails to answer is
    /// [`ScrivenerError::IntentUnavailable`].
    pub async fn classify(
        &self,
        input: &str,
    ) -> Result<(IntentDecision, IntentSource), ScrivenerError> {
        if !self.client.is_configured() {
            debug!("No intent classifier configured, using default decision");
            return Ok((IntentDecision::fallback(), IntentSource::Default));
        }

        let request = LlmRequest::new(SYSTEM_PROMPT, intent_prompt(input))
            .with_temperature(0.0)
            .with_max_tokens(200);

        match self.client.complete(request).await {
            Ok(raw) => {
                debug!(raw = %truncate_for_log(&raw, 200), "Intent classifier reply");
                let decision = parse_intent(&raw)?;
                Ok((decision, IntentSource::Classified))
            }
            Err(LlmError::MissingCredentials) => {
                Ok((IntentDecision::fallback(), IntentSource::Default))
            }
            Err(e) => {
                warn!("Intent classifier unavailable: {}", e);
                Err(ScrivenerError::IntentUnavailable(e.to_string()))
            }
        }
    }
}
