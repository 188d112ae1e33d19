//! Story outlining and expansion.
//!
//! [`StoryPlanner`] turns a prompt into a bullet outline; [`ScriptGenerator`]
//! expands an outline into prose. Both pass their input through unchanged
//! when the model is unavailable.

use std::sync::Arc;

use crate::llm::{LlmClient, LlmRequest};
use crate::models::{Length, StageOutput, Tone};

use super::stage::complete_or_passthrough;

const PLANNER_SYSTEM_PROMPT: &str = "Story planner.";
const WRITER_SYSTEM_PROMPT: &str = "You write cinematic high-quality stories.";

pub(crate) fn plan_prompt(prompt: &str, genre: &str) -> String {
    format!(
        "Create a structured story plan.\n\nGenre: {genre}\n\nBased on:\n{prompt}\n\nReturn bullet point outline."
    )
}

/// Optional size targets, rendered as "Write approximately N words. Use about M sentences. ".
pub(crate) fn length_instruction(
    target_words: Option<u32>,
    target_sentences: Option<u32>,
) -> String {
    let mut instruction = String::new();
    if let Some(words) = target_words {
        instruction.push_str(&format!("Write approximately {words} words. "));
    }
    if let Some(sentences) = target_sentences {
        instruction.push_str(&format!("Use about {sentences} sentences. "));
    }
    instruction
}

pub(crate) fn script_prompt(
    plan: &str,
    tone: &Tone,
    length: Length,
    target_words: Option<u32>,
    target_sentences: Option<u32>,
) -> String {
    format!(
        "You are a professional creative writer.\n\n\
         Write a {tone} story.\n\n\
         Preset length level: {length}.\n\n\
         {targets}\n\n\
         Ensure:\n\
         - Strong narrative flow\n\
         - Emotional depth\n\
         - Coherent structure\n\
         - No formatting symbols\n\
         - No bullet points\n\n\
         Story Plan:\n{plan}",
        tone = tone.profile(),
        targets = length_instruction(target_words, target_sentences).trim_end(),
    )
}

pub struct StoryPlanner {
    client: Arc<dyn LlmClient>,
}

impl StoryPlanner {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub async fn plan(&self, prompt: &str, genre: &str) -> StageOutput {
        let request = LlmRequest::new(PLANNER_SYSTEM_PROMPT, plan_prompt(prompt, genre))
            .with_temperature(0.7)
            .with_max_tokens(400);
        complete_or_passthrough(self.client.as_ref(), "plan", request, prompt).await
    }
}

pub struct ScriptGenerator {
    client: Arc<dyn LlmClient>,
}

impl ScriptGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Expand `plan` into a story. Without targets only `length` governs size.
    pub async fn expand(
        &self,
        plan: &str,
        tone: &Tone,
        length: Length,
        target_words: Option<u32>,
        target_sentences: Option<u32>,
    ) -> StageOutput {
        let prompt = script_prompt(plan, tone, length, target_words, target_sentences);
        let request = LlmRequest::new(WRITER_SYSTEM_PROMPT, prompt)
            .with_temperature(0.8)
            .with_max_tokens(900);
        complete_or_passthrough(self.client.as_ref(), "expand", request, plan).await
    }
}
