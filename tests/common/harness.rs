//! Test harness wiring an orchestrator over in-memory backends.

use std::sync::Arc;
use std::time::Duration;

use scrivener::embedding::{EmbeddingService, NoopEmbeddingService};
use scrivener::llm::LlmClient;
use scrivener::services::{ComparisonPolicy, ConsistencyTracker, Orchestrator};
use scrivener::session::InMemorySessionStore;

use super::builders::{BagOfWordsEmbedder, ScriptedLlm};

/// Orchestrator plus handles on its scripted LLM.
///
/// Each harness owns a fresh session store, so tests never share state.
pub struct TestHarness {
    pub orchestrator: Orchestrator,
    pub llm: Arc<ScriptedLlm>,
}

impl TestHarness {
    /// No API key configured; every generative stage passes through.
    pub fn offline() -> Self {
        Self::build(ScriptedLlm::unconfigured(), embedder())
    }

    /// LLM answering with `replies` in call order.
    pub fn scripted(replies: Vec<&str>) -> Self {
        Self::build(ScriptedLlm::new(replies), embedder())
    }

    pub fn with_llm(llm: ScriptedLlm) -> Self {
        Self::build(llm, embedder())
    }

    /// Embedding model not loaded.
    pub fn without_embeddings() -> Self {
        Self::build(
            ScriptedLlm::unconfigured(),
            Arc::new(NoopEmbeddingService::new()),
        )
    }

    pub fn with_policy(policy: ComparisonPolicy) -> Self {
        let llm = Arc::new(ScriptedLlm::unconfigured());
        Self {
            orchestrator: Orchestrator::new(llm.clone() as Arc<dyn LlmClient>, tracker(embedder(), policy)),
            llm,
        }
    }

    fn build(llm: ScriptedLlm, embedding: Arc<dyn EmbeddingService + Send + Sync>) -> Self {
        let llm = Arc::new(llm);
        Self {
            orchestrator: Orchestrator::new(
                llm.clone() as Arc<dyn LlmClient>,
                tracker(embedding, ComparisonPolicy::RunningAverage),
            ),
            llm,
        }
    }
}

fn embedder() -> Arc<dyn EmbeddingService + Send + Sync> {
    Arc::new(BagOfWordsEmbedder::new())
}

fn tracker(
    embedding: Arc<dyn EmbeddingService + Send + Sync>,
    policy: ComparisonPolicy,
) -> Arc<ConsistencyTracker> {
    Arc::new(ConsistencyTracker::new(
        embedding,
        Arc::new(InMemorySessionStore::new()),
        policy,
        Duration::from_secs(5),
    ))
}
