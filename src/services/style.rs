//! Tone- and level-driven rewriting.

use std::sync::Arc;

use crate::llm::{LlmClient, LlmRequest};
use crate::models::{Level, StageOutput, Tone};

use super::stage::complete_or_passthrough;

const SYSTEM_PROMPT: &str = "Professional writing assistant.";

pub(crate) fn rewrite_prompt(text: &str, tone: &Tone, level: Level) -> String {
    format!(
        "Rewrite the following text.\n\nTone: {}\nEnhancement level: {}\n\nPreserve original meaning.\n\nText:\n{}",
        tone.profile(),
        level.instruction(),
        text
    )
}

pub struct StyleRewriter {
    client: Arc<dyn LlmClient>,
}

impl StyleRewriter {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Rewrite `text`, or return it unchanged if the model is unavailable.
    pub async fn rewrite(&self, text: &str, tone: &Tone, level: Level) -> StageOutput {
        let request = LlmRequest::new(SYSTEM_PROMPT, rewrite_prompt(text, tone, level))
            .with_temperature(0.7)
            .with_max_tokens(400);
        complete_or_passthrough(self.client.as_ref(), "rewrite", request, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedLlmClient;
    use crate::llm::NoopLlmClient;

    #[test]
    fn test_prompt_uses_profiles() {
        insta::assert_snapshot!(
            rewrite_prompt("the cat sat", &Tone::Formal, Level::Low),
            @r"
        Rewrite the following text.

        Tone: formal and professional
        Enhancement level: Make minimal changes.

        Preserve original meaning.

        Text:
        the cat sat
        "
        );
    }

    #[tokio::test]
    async fn test_unconfigured_backend_returns_original() {
        let rewriter = StyleRewriter::new(Arc::new(NoopLlmClient::new()));
        let out = rewriter
            .rewrite("The sky is blue.", &Tone::Dark, Level::High)
            .await;
        assert_eq!(out.text, "The sky is blue.");
        assert!(out.degraded());
    }

    #[tokio::test]
    async fn test_unconfigured_backend_keeps_layout() {
        let input = "First line.\n\nSecond   line.";
        let rewriter = StyleRewriter::new(Arc::new(NoopLlmClient::new()));
        let out = rewriter.rewrite(input, &Tone::Formal, Level::Medium).await;
        assert_eq!(out.text, input);
        assert!(out.degraded());
    }

    #[tokio::test]
    async fn test_rewrite_sends_stage_parameters() {
        let client = Arc::new(ScriptedLlmClient::replying("The feline was seated."));
        let rewriter = StyleRewriter::new(client.clone());
        let out = rewriter
            .rewrite("the cat sat", &Tone::Custom("wry".into()), Level::Medium)
            .await;
        assert_eq!(out, StageOutput::generated("The feline was seated.".into()));

        let request = &client.requests()[0];
        assert_eq!(request.system, "Professional writing assistant.");
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_tokens, 400);
        assert!(request.user.contains("Tone: wry\n"));
    }
}
