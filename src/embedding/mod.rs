//! Embedding infrastructure for consistency tracking.
//!
//! The [`EmbeddingService`] trait abstracts the embedding model so the
//! consistency tracker can run against the local candle model in production
//! and against deterministic stubs in tests.

pub mod candle_backend;
pub mod model;
pub mod provider;

use async_trait::async_trait;

use crate::ScrivenerError;

pub use model::{EmbeddingConfig, LocalEmbeddingService, DEFAULT_EMBEDDING_MODEL};
pub use provider::{create_embedding_service, EmbeddingProviderConfig};

/// No-op embedding service.
///
/// Always reports as unavailable. Selected by `provider = "disabled"`, and
/// used in tests that exercise the fatal consistency path.
pub struct NoopEmbeddingService;

impl Default for NoopEmbeddingService {
    fn default() -> Self {
        Self::new()
    }
}

impl NoopEmbeddingService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmbeddingService for NoopEmbeddingService {
    async fn embed_text(&self, _text: &str) -> Result<Vec<f32>, ScrivenerError> {
        Err(ScrivenerError::EmbeddingUnavailable(
            "Embedding service is disabled (noop)".to_string(),
        ))
    }

    fn dimensions(&self) -> usize {
        384
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Service trait for generating text embeddings.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generate the embedding for a single text.
    ///
    /// Fails with [`ScrivenerError::EmbeddingUnavailable`] when the model is
    /// not loaded or produced a malformed vector.
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, ScrivenerError>;

    /// Embedding dimensions (384 for all-MiniLM-L6-v2).
    fn dimensions(&self) -> usize;

    /// Whether the embedding model is loaded.
    fn is_available(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_service_is_unavailable() {
        let service = NoopEmbeddingService::new();
        assert!(!service.is_available());
        assert_eq!(service.dimensions(), 384);
        let err = service.embed_text("hello").await.expect_err("noop fails");
        assert!(matches!(err, ScrivenerError::EmbeddingUnavailable(_)));
    }
}
