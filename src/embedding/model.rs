//! Local embedding model implementation using candle.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::embedding::candle_backend::{download_model, select_device, BertEmbedder};
use crate::embedding::EmbeddingService;
use crate::ScrivenerError;

/// Default sentence-transformer checkpoint.
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// all-MiniLM-L6-v2 hidden size, reported while the model is unavailable.
const FALLBACK_DIMENSIONS: usize = 384;

/// Configuration for embedding model initialization.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// HuggingFace repo id of the checkpoint
    pub model: String,
    /// Optional hub cache directory for model files
    pub cache_dir: Option<PathBuf>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            cache_dir: None,
        }
    }
}

/// Local embedding service backed by [`BertEmbedder`].
///
/// Inference is CPU/GPU-bound, so it runs on the blocking pool.
pub struct LocalEmbeddingService {
    embedder: Option<Arc<BertEmbedder>>,
    dimensions: usize,
    model_name: String,
}

impl LocalEmbeddingService {
    /// Download and load the configured model.
    ///
    /// A load failure (no network on first run, corrupt cache) leaves the
    /// service unavailable instead of erroring; every embed call then fails
    /// and consistency evaluation reports `EmbeddingUnavailable`.
    pub fn new(config: EmbeddingConfig) -> Self {
        let loaded = download_model(&config.model, config.cache_dir.clone())
            .and_then(|files| BertEmbedder::new(&files, select_device()));

        match loaded {
            Ok(embedder) => {
                info!(
                    model = %config.model,
                    dimensions = embedder.hidden_size(),
                    "Embedding model loaded"
                );
                Self {
                    dimensions: embedder.hidden_size(),
                    embedder: Some(Arc::new(embedder)),
                    model_name: config.model,
                }
            }
            Err(e) => {
                warn!(
                    "Failed to load embedding model {}: {:#}. Embedding service will be unavailable.",
                    config.model, e
                );
                Self {
                    embedder: None,
                    dimensions: FALLBACK_DIMENSIONS,
                    model_name: config.model,
                }
            }
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl EmbeddingService for LocalEmbeddingService {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, ScrivenerError> {
        let embedder = self
            .embedder
            .as_ref()
            .ok_or_else(|| {
                ScrivenerError::EmbeddingUnavailable(format!(
                    "model {} is not loaded",
                    self.model_name
                ))
            })?
            .clone();

        let text = text.to_string();
        let vectors = tokio::task::spawn_blocking(move || embedder.embed(&[text]))
            .await
            .map_err(|e| ScrivenerError::EmbeddingUnavailable(format!("Task join error: {}", e)))?
            .map_err(|e| ScrivenerError::EmbeddingUnavailable(format!("Embedding error: {}", e)))?;

        let vector = vectors.into_iter().next().ok_or_else(|| {
            ScrivenerError::EmbeddingUnavailable("No embedding returned".to_string())
        })?;

        if vector.len() != self.dimensions || vector.iter().any(|v| !v.is_finite()) {
            return Err(ScrivenerError::EmbeddingUnavailable(format!(
                "malformed embedding: {} values, expected {}",
                vector.len(),
                self.dimensions
            )));
        }

        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn is_available(&self) -> bool {
        self.embedder.is_some()
    }
}
