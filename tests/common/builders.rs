//! Deterministic stand-ins for the model backends.

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use async_trait::async_trait;

use scrivener::embedding::EmbeddingService;
use scrivener::llm::{LlmClient, LlmError, LlmRequest};
use scrivener::ScrivenerError;

/// LLM that replays queued replies in order and records every request.
///
/// An exhausted queue answers with a timeout. An unconfigured instance
/// behaves like a missing API key.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<LlmRequest>>,
    configured: bool,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<&str>) -> Self {
        Self::with_results(replies.into_iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn with_results(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            configured: true,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            configured: false,
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Requests sent with the given system prompt.
    pub fn requests_for(&self, system: &str) -> Vec<LlmRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.system == system)
            .collect()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError> {
        self.requests.lock().expect("requests lock").push(request);
        if !self.configured {
            return Err(LlmError::MissingCredentials);
        }
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or(Err(LlmError::Timeout))
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

/// Hashes lowercase words into a fixed number of buckets.
///
/// Identical texts embed identically; texts sharing no words are orthogonal.
pub struct BagOfWordsEmbedder {
    dims: usize,
}

impl BagOfWordsEmbedder {
    pub fn new() -> Self {
        Self { dims: 64 }
    }
}

impl Default for BagOfWordsEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingService for BagOfWordsEmbedder {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, ScrivenerError> {
        let mut vector = vec![0.0f32; self.dims];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() as usize) % self.dims] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn is_available(&self) -> bool {
        true
    }
}
