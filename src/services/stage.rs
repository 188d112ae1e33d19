//! Shared plumbing for best-effort generative stages.

use tracing::{debug, warn};

use crate::llm::{LlmClient, LlmError, LlmRequest};
use crate::models::StageOutput;
use crate::utils::text::{normalize_whitespace, truncate_for_log};

const LOG_PREVIEW_CHARS: usize = 200;

/// Run `request`; on any failure or blank reply return `input` instead.
///
/// Model replies are whitespace-normalized. A passed-through input is
/// returned exactly as given.
pub(crate) async fn complete_or_passthrough(
    client: &dyn LlmClient,
    stage: &'static str,
    request: LlmRequest,
    input: &str,
) -> StageOutput {
    debug!(
        stage,
        prompt = %truncate_for_log(&request.user, LOG_PREVIEW_CHARS),
        "LLM request"
    );

    match client.complete(request).await {
        Ok(reply) if !reply.trim().is_empty() => {
            debug!(
                stage,
                reply = %truncate_for_log(&reply, LOG_PREVIEW_CHARS),
                "LLM reply"
            );
            StageOutput::generated(normalize_whitespace(&reply))
        }
        Ok(_) => {
            warn!(stage, "Model returned empty output, passing input through");
            StageOutput::passthrough(input.to_string(), "empty model output")
        }
        Err(LlmError::MissingCredentials) => {
            debug!(stage, "No credentials configured, passing input through");
            StageOutput::passthrough(input.to_string(), LlmError::MissingCredentials.to_string())
        }
        Err(e) => {
            warn!(stage, "Model call failed, passing input through: {}", e);
            StageOutput::passthrough(input.to_string(), e.to_string())
        }
    }
}
