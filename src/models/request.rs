//! Pipeline requests and their parameter checks.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::intent::DEFAULT_GENRE;
use super::style::{Length, Level, Tone, WriterMode};
use crate::session::SessionId;
use crate::ScrivenerError;

pub const MAX_TARGET_WORDS: u32 = 5000;
pub const MAX_TARGET_SENTENCES: u32 = 500;

fn default_genre() -> String {
    DEFAULT_GENRE.to_string()
}

fn default_story_tone() -> Tone {
    Tone::Storyteller
}

/// Rewrite `text` under a tone and level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeRequest {
    pub session_id: SessionId,
    pub text: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub level: Level,
}

impl AnalyzeRequest {
    pub fn new(session_id: SessionId, text: impl Into<String>) -> Self {
        Self {
            session_id,
            text: text.into(),
            tone: Tone::default(),
            level: Level::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ScrivenerError> {
        require_text("text", &self.text)
    }
}

/// Plan and write a story from `prompt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GenerateRequest {
    pub session_id: SessionId,
    pub prompt: String,
    #[serde(default = "default_genre")]
    pub genre: String,
    #[serde(default = "default_story_tone")]
    pub tone: Tone,
    #[serde(default)]
    pub length: Length,
    #[serde(default)]
    pub target_words: Option<u32>,
    #[serde(default)]
    pub target_sentences: Option<u32>,
}

impl GenerateRequest {
    pub fn new(session_id: SessionId, prompt: impl Into<String>) -> Self {
        Self {
            session_id,
            prompt: prompt.into(),
            genre: default_genre(),
            tone: default_story_tone(),
            length: Length::default(),
            target_words: None,
            target_sentences: None,
        }
    }

    pub fn validate(&self) -> Result<(), ScrivenerError> {
        require_text("prompt", &self.prompt)?;
        validate_targets(self.target_words, self.target_sentences)
    }
}

/// Free-form input routed by the intent classifier.
///
/// `tone`, `level` and `genre` override whatever the classifier inferred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WriterRequest {
    pub session_id: SessionId,
    pub user_input: String,
    #[serde(default)]
    pub mode: WriterMode,
    #[serde(default)]
    pub tone: Option<Tone>,
    #[serde(default)]
    pub level: Option<Level>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub target_words: Option<u32>,
    #[serde(default)]
    pub target_sentences: Option<u32>,
}

impl WriterRequest {
    pub fn new(session_id: SessionId, user_input: impl Into<String>) -> Self {
        Self {
            session_id,
            user_input: user_input.into(),
            mode: WriterMode::default(),
            tone: None,
            level: None,
            genre: None,
            language: None,
            target_words: None,
            target_sentences: None,
        }
    }

    pub fn validate(&self) -> Result<(), ScrivenerError> {
        require_text("user_input", &self.user_input)?;
        validate_targets(self.target_words, self.target_sentences)
    }

    /// Input as sent to routing, with the output-language marker if needed.
    pub fn routed_input(&self) -> String {
        match self.language.as_deref().map(str::trim) {
            Some(lang) if !lang.is_empty() && !lang.eq_ignore_ascii_case("english") => {
                format!("[OUTPUT IN {}] {}", lang.to_uppercase(), self.user_input)
            }
            _ => self.user_input.clone(),
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), ScrivenerError> {
    if value.trim().is_empty() {
        return Err(ScrivenerError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_targets(
    target_words: Option<u32>,
    target_sentences: Option<u32>,
) -> Result<(), ScrivenerError> {
    if let Some(words) = target_words {
        if !(1..=MAX_TARGET_WORDS).contains(&words) {
            return Err(ScrivenerError::Validation(format!(
                "target_words must be between 1 and {MAX_TARGET_WORDS}, got {words}"
            )));
        }
    }
    if let Some(sentences) = target_sentences {
        if !(1..=MAX_TARGET_SENTENCES).contains(&sentences) {
            return Err(ScrivenerError::Validation(format!(
                "target_sentences must be between 1 and {MAX_TARGET_SENTENCES}, got {sentences}"
            )));
        }
    }
    Ok(())
}
