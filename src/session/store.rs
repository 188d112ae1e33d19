//! Per-session embedding memory used by the consistency tracker.
//!
//! State is volatile by contract: both stores here live in process memory and
//! start empty on restart.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tokio::sync::RwLock;

use crate::ScrivenerError;

/// Writing-session identifier, assigned by the persistence layer.
pub type SessionId = i64;

/// What the tracker remembers about one session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMemory {
    /// A single reference vector, folded toward each new embedding.
    RunningAverage {
        reference: Vec<f32>,
        /// Number of texts folded into `reference`
        samples: usize,
    },
    /// Every embedding seen, oldest first.
    History { embeddings: Vec<Vec<f32>> },
}

impl SessionMemory {
    /// The vector new text is compared against.
    pub fn reference(&self) -> Option<&[f32]> {
        match self {
            SessionMemory::RunningAverage { reference, .. } => Some(reference),
            SessionMemory::History { embeddings } => embeddings.last().map(Vec::as_slice),
        }
    }

    /// Number of texts recorded for the session.
    pub fn len(&self) -> usize {
        match self {
            SessionMemory::RunningAverage { samples, .. } => *samples,
            SessionMemory::History { embeddings } => embeddings.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Backing store for session memory, keyed by session id.
///
/// Stores are plain get/put maps. Read-modify-write atomicity is the
/// tracker's job (it holds a per-session lock across get and put).
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: SessionId) -> Result<Option<SessionMemory>, ScrivenerError>;

    async fn put(&self, session_id: SessionId, memory: SessionMemory)
        -> Result<(), ScrivenerError>;

    /// Number of sessions currently held.
    async fn session_count(&self) -> usize;
}

/// Unbounded in-memory store.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionMemory>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: SessionId) -> Result<Option<SessionMemory>, ScrivenerError> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn put(
        &self,
        session_id: SessionId,
        memory: SessionMemory,
    ) -> Result<(), ScrivenerError> {
        self.sessions.write().await.insert(session_id, memory);
        Ok(())
    }

    async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Bounded store for long-running processes.
///
/// Sessions idle longer than `idle` (or pushed out by `capacity`) are
/// dropped; the next text for such a session becomes a fresh anchor.
pub struct CachedSessionStore {
    sessions: Cache<SessionId, SessionMemory>,
}

impl CachedSessionStore {
    pub fn new(capacity: u64, idle: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle)
            .build();
        Self { sessions }
    }
}

#[async_trait]
impl SessionStore for CachedSessionStore {
    async fn get(&self, session_id: SessionId) -> Result<Option<SessionMemory>, ScrivenerError> {
        Ok(self.sessions.get(&session_id).await)
    }

    async fn put(
        &self,
        session_id: SessionId,
        memory: SessionMemory,
    ) -> Result<(), ScrivenerError> {
        self.sessions.insert(session_id, memory).await;
        Ok(())
    }

    async fn session_count(&self) -> usize {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count() as usize
    }
}
