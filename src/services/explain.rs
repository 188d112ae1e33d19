use crate::models::{Explanation, Level, Tone};
use crate::services::readability::round2;

pub const STRUCTURAL_CHANGE: &str = "Refinement applied based on selected level.";

/// Summarize an enhancement. Pure; a NaN readability propagates.
pub fn explain(
    _original: &str,
    _enhanced: &str,
    readability_before: f64,
    readability_after: f64,
    tone: &Tone,
    level: Level,
) -> Explanation {
    Explanation {
        tone_applied: tone.clone(),
        enhancement_level: level,
        readability_change: round2(readability_after - readability_before),
        structural_change: STRUCTURAL_CHANGE.to_string(),
    }
}
