//! Routing decisions for free-form writer input.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::style::{Length, Level, Tone};

pub const DEFAULT_GENRE: &str = "general";

/// Which pipeline the writer runs, with the parameters the classifier inferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "task_type", rename_all = "snake_case")]
pub enum IntentDecision {
    ContentEnhancement {
        tone: Tone,
        level: Level,
    },
    ScriptGeneration {
        genre: String,
        tone: Tone,
        length: Length,
    },
}

impl IntentDecision {
    /// Decision used when no classifier backend is configured.
    pub fn fallback() -> Self {
        IntentDecision::ContentEnhancement {
            tone: Tone::Formal,
            level: Level::Medium,
        }
    }

    /// Default script parameters for a generation branch chosen without a
    /// classifier verdict.
    pub fn default_script() -> Self {
        IntentDecision::ScriptGeneration {
            genre: DEFAULT_GENRE.to_string(),
            tone: Tone::Storyteller,
            length: Length::Medium,
        }
    }

    pub fn task_type(&self) -> &'static str {
        match self {
            IntentDecision::ContentEnhancement { .. } => "content_enhancement",
            IntentDecision::ScriptGeneration { .. } => "script_generation",
        }
    }
}

/// Where a routing decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IntentSource {
    /// The classifier model answered and its output parsed.
    Classified,
    /// No classifier backend; the deterministic default was used.
    Default,
}

/// Decision actually applied by the writer, after caller overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RoutedIntent {
    #[serde(flatten)]
    pub decision: IntentDecision,
    pub source: IntentSource,
}
