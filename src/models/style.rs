//! Style parameters shared by the rewriter, planner and script generator.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ScrivenerError;

// ============================================================================
// Tone
// ============================================================================

/// Voice the output should be written in.
///
/// Serializes as a plain string. Known tones map to a descriptive profile;
/// any other string is a free-form prompt fragment used verbatim.
#[derive(Debug, Clone, PartialEq, Eq, JsonSchema, Default)]
pub enum Tone {
    #[default]
    Formal,
    Academic,
    Casual,
    Storyteller,
    Dark,
    Technical,
    Persuasive,
    Custom(String),
}

impl Tone {
    /// Parse a tone name. Known names are matched case-insensitively.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "formal" => Tone::Formal,
            "academic" => Tone::Academic,
            "casual" => Tone::Casual,
            "storyteller" => Tone::Storyteller,
            "dark" => Tone::Dark,
            "technical" => Tone::Technical,
            "persuasive" => Tone::Persuasive,
            _ => Tone::Custom(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tone::Formal => "formal",
            Tone::Academic => "academic",
            Tone::Casual => "casual",
            Tone::Storyteller => "storyteller",
            Tone::Dark => "dark",
            Tone::Technical => "technical",
            Tone::Persuasive => "persuasive",
            Tone::Custom(s) => s,
        }
    }

    /// Descriptive phrase placed in prompts.
    pub fn profile(&self) -> &str {
        match self {
            Tone::Formal => "formal and professional",
            Tone::Academic => "academic and analytical",
            Tone::Casual => "casual and conversational",
            Tone::Storyteller => "vivid and immersive narrative",
            Tone::Dark => "dark and intense",
            Tone::Technical => "precise and technical",
            Tone::Persuasive => "convincing and persuasive",
            Tone::Custom(s) => s,
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Tone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Tone::parse(&s))
    }
}

// ============================================================================
// Level and Length
// ============================================================================

/// How aggressively the rewriter may change the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    #[default]
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }

    /// Instruction placed in the rewrite prompt.
    pub fn instruction(&self) -> &'static str {
        match self {
            Level::Low => "Make minimal changes.",
            Level::Medium => "Moderately improve vocabulary and structure.",
            Level::High => "Deeply restructure sentences and elevate vocabulary.",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ScrivenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Level::Low),
            "medium" => Ok(Level::Medium),
            "high" => Ok(Level::High),
            other => Err(ScrivenerError::Validation(format!(
                "unknown level '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

/// Preset size of a generated story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    #[default]
    Medium,
    Long,
}

impl Length {
    pub fn as_str(&self) -> &'static str {
        match self {
            Length::Short => "short",
            Length::Medium => "medium",
            Length::Long => "long",
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Length {
    type Err = ScrivenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(Length::Short),
            "medium" => Ok(Length::Medium),
            "long" => Ok(Length::Long),
            other => Err(ScrivenerError::Validation(format!(
                "unknown length '{other}' (expected short, medium or long)"
            ))),
        }
    }
}

/// Branch the writer takes when the intent could not be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum WriterMode {
    #[default]
    Enhance,
    Generate,
}

impl FromStr for WriterMode {
    type Err = ScrivenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enhance" => Ok(WriterMode::Enhance),
            "generate" => Ok(WriterMode::Generate),
            other => Err(ScrivenerError::Validation(format!(
                "unknown writer mode '{other}' (expected enhance or generate)"
            ))),
        }
    }
}
