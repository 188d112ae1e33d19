//! Emotion classification over the closed seven-label vocabulary.
//!
//! Classification never fails a pipeline: anything other than an exact label
//! (including backend errors and missing credentials) yields `neutral`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::llm::{LlmClient, LlmError, LlmRequest};
use crate::models::Emotion;
use crate::utils::text::truncate_for_log;

const SYSTEM_PROMPT: &str = "Emotion classifier.";

#[async_trait]
pub trait EmotionService: Send + Sync {
    async fn classify(&self, text: &str) -> Emotion;
}

/// Classifies through a constrained one-word completion.
pub struct LlmEmotionClassifier {
    client: Arc<dyn LlmClient>,
}

impl LlmEmotionClassifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

pub(crate) fn emotion_prompt(text: &str) -> String {
    let labels = Emotion::ALL
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Classify the dominant emotion.\n\nAllowed emotions:\n{labels}\n\nReturn ONLY one word.\n\nText:\n{text}"
    )
}

#[async_trait]
impl EmotionService for LlmEmotionClassifier {
    async fn classify(&self, text: &str) -> Emotion {
        let request = LlmRequest::new(SYSTEM_PROMPT, emotion_prompt(text))
            .with_temperature(0.0)
            .with_max_tokens(10);

        match self.client.complete(request).await {
            Ok(reply) => Emotion::from_label(&reply).unwrap_or_else(|| {
                debug!(reply = %truncate_for_log(&reply, 40), "Emotion outside vocabulary");
                Emotion::Neutral
            }),
            Err(LlmError::MissingCredentials) => Emotion::Neutral,
            Err(e) => {
                warn!("Emotion classification failed, using neutral: {}", e);
                Emotion::Neutral
            }
        }
    }
}

/// Always answers `neutral`.
pub struct NoopEmotionService;

impl Default for NoopEmotionService {
    fn default() -> Self {
        Self::new()
    }
}

impl NoopEmotionService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmotionService for NoopEmotionService {
    async fn classify(&self, _text: &str) -> Emotion {
        Emotion::Neutral
    }
}
