//! Topical consistency tracking across a writing session.
//!
//! Each text is embedded and compared (cosine similarity) against the
//! session's reference embedding. The first text of a session is the anchor
//! and always scores `drift = 0.0, consistency = 1.0`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::embedding::EmbeddingService;
use crate::session::{SessionId, SessionMemory, SessionStore};
use crate::utils::math::{cosine_similarity, vector_midpoint};
use crate::ScrivenerError;

/// How the session reference embedding evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonPolicy {
    /// Compare against a running average; fold each new embedding into it.
    #[default]
    RunningAverage,
    /// Keep every embedding; compare against the most recent one.
    FullHistory,
}

/// Drift and consistency for one evaluated text.
///
/// `drift_score + consistency_score == 1` by construction. Neither is
/// clamped: an anti-correlated text yields `consistency < 0`, `drift > 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConsistencyScore {
    pub drift_score: f64,
    pub consistency_score: f64,
}

impl ConsistencyScore {
    /// Score of the first text in a session.
    pub const ANCHOR: ConsistencyScore = ConsistencyScore {
        drift_score: 0.0,
        consistency_score: 1.0,
    };

    pub fn from_similarity(similarity: f64) -> Self {
        Self {
            drift_score: 1.0 - similarity,
            consistency_score: similarity,
        }
    }
}

/// Compare `embedding` with the previous memory and produce the next one.
fn advance(
    policy: ComparisonPolicy,
    previous: Option<SessionMemory>,
    embedding: Vec<f32>,
) -> (ConsistencyScore, SessionMemory) {
    let anchor = |embedding: Vec<f32>| match policy {
        ComparisonPolicy::RunningAverage => SessionMemory::RunningAverage {
            reference: embedding,
            samples: 1,
        },
        ComparisonPolicy::FullHistory => SessionMemory::History {
            embeddings: vec![embedding],
        },
    };

    let Some(previous) = previous else {
        return (ConsistencyScore::ANCHOR, anchor(embedding));
    };
    let Some(reference) = previous.reference() else {
        return (ConsistencyScore::ANCHOR, anchor(embedding));
    };
    if reference.len() != embedding.len() {
        warn!(
            stored = reference.len(),
            incoming = embedding.len(),
            "Embedding dimensions changed; re-anchoring session"
        );
        return (ConsistencyScore::ANCHOR, anchor(embedding));
    }

    let score = ConsistencyScore::from_similarity(cosine_similarity(&embedding, reference));

    let next = match (policy, previous) {
        (ComparisonPolicy::RunningAverage, SessionMemory::RunningAverage { reference, samples }) => {
            SessionMemory::RunningAverage {
                reference: vector_midpoint(&reference, &embedding),
                samples: samples + 1,
            }
        }
        (ComparisonPolicy::RunningAverage, history @ SessionMemory::History { .. }) => {
            let samples = history.len() + 1;
            let reference = history.reference().map(|r| vector_midpoint(r, &embedding));
            SessionMemory::RunningAverage {
                reference: reference.unwrap_or(embedding),
                samples,
            }
        }
        (ComparisonPolicy::FullHistory, SessionMemory::History { mut embeddings }) => {
            embeddings.push(embedding);
            SessionMemory::History { embeddings }
        }
        (ComparisonPolicy::FullHistory, SessionMemory::RunningAverage { reference, .. }) => {
            SessionMemory::History {
                embeddings: vec![reference, embedding],
            }
        }
    };

    (score, next)
}

/// Per-session drift tracker.
///
/// Concurrency: the embedding is computed without holding any lock; the
/// get-compare-put against the store runs under a per-session async mutex,
/// so same-session requests serialize and other sessions are unaffected.
/// A lock entry is dropped once no request for its session holds it.
pub struct ConsistencyTracker {
    embedding_service: Arc<dyn EmbeddingService + Send + Sync>,
    store: Arc<dyn SessionStore>,
    policy: ComparisonPolicy,
    embed_timeout: Duration,
    session_locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl ConsistencyTracker {
    pub fn new(
        embedding_service: Arc<dyn EmbeddingService + Send + Sync>,
        store: Arc<dyn SessionStore>,
        policy: ComparisonPolicy,
        embed_timeout: Duration,
    ) -> Self {
        Self {
            embedding_service,
            store,
            policy,
            embed_timeout,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> ComparisonPolicy {
        self.policy
    }

    /// Score `text` against the session history and record it.
    ///
    /// Fails with [`ScrivenerError::EmbeddingUnavailable`] if the text cannot
    /// be embedded in time; the session state is left untouched in that case.
    pub async fn evaluate(
        &self,
        session_id: SessionId,
        text: &str,
    ) -> Result<ConsistencyScore, ScrivenerError> {
        let embedding = self.embed(text).await?;

        let lock = self.session_lock(session_id).await;
        let recorded = {
            let _guard = lock.lock().await;
            self.record(session_id, embedding).await
        };
        self.release_session_lock(session_id, lock).await;
        let (score, seen) = recorded?;

        debug!(
            session_id,
            seen,
            drift = score.drift_score,
            consistency = score.consistency_score,
            "consistency evaluated"
        );
        Ok(score)
    }

    /// Number of texts recorded for a session.
    pub async fn session_len(&self, session_id: SessionId) -> Result<usize, ScrivenerError> {
        Ok(self
            .store
            .get(session_id)
            .await?
            .map(|m| m.len())
            .unwrap_or(0))
    }

    pub async fn session_count(&self) -> usize {
        self.store.session_count().await
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ScrivenerError> {
        match tokio::time::timeout(self.embed_timeout, self.embedding_service.embed_text(text)).await
        {
            Ok(result) => result,
            Err(_) => Err(ScrivenerError::EmbeddingUnavailable(format!(
                "embedding timed out after {}s",
                self.embed_timeout.as_secs_f64()
            ))),
        }
    }

    async fn record(
        &self,
        session_id: SessionId,
        embedding: Vec<f32>,
    ) -> Result<(ConsistencyScore, usize), ScrivenerError> {
        let previous = self.store.get(session_id).await?;
        let seen = previous.as_ref().map(SessionMemory::len).unwrap_or(0);
        let (score, next) = advance(self.policy, previous, embedding);
        self.store.put(session_id, next).await?;
        Ok((score, seen))
    }

    async fn session_lock(&self, session_id: SessionId) -> Arc<Mutex<()>> {
        self.session_locks
            .lock()
            .await
            .entry(session_id)
            .or_default()
            .clone()
    }

    async fn release_session_lock(&self, session_id: SessionId, lock: Arc<Mutex<()>>) {
        let mut locks = self.session_locks.lock().await;
        // Clones are only handed out under the map lock, so the count is stable
        // here: the map entry plus `lock` means no other request is waiting.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&session_id);
        }
    }

    #[cfg(test)]
    async fn lock_count(&self) -> usize {
        self.session_locks.lock().await.len()
    }
}
