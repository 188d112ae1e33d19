//! Embedding provider configuration and factory.
//!
//! Supports multiple embedding backends via a tagged enum configuration.
//! Default is the local candle model (all-MiniLM-L6-v2).

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::embedding::{EmbeddingConfig, EmbeddingService, LocalEmbeddingService, NoopEmbeddingService};
use crate::ScrivenerError;

/// Embedding provider configuration, the `[embedding]` table of
/// `scrivener.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum EmbeddingProviderConfig {
    /// Local candle model (default).
    Local {
        /// HuggingFace repo id (default: "sentence-transformers/all-MiniLM-L6-v2")
        #[serde(default = "default_local_model")]
        model: String,
        /// Hub cache directory, relative paths resolve against the data path
        #[serde(default)]
        cache_dir: Option<String>,
        /// Per-call inference timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// No embedding model. Every consistency evaluation fails.
    Disabled,
}

fn default_local_model() -> String {
    super::DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for EmbeddingProviderConfig {
    fn default() -> Self {
        Self::Local {
            model: default_local_model(),
            cache_dir: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingProviderConfig {
    /// Timeout applied around each embedding call.
    pub fn timeout_secs(&self) -> u64 {
        match self {
            Self::Local { timeout_secs, .. } => *timeout_secs,
            Self::Disabled => default_timeout_secs(),
        }
    }
}

/// Create an embedding service from provider configuration.
///
/// Loading the local model performs blocking network and disk I/O.
pub fn create_embedding_service(
    config: &EmbeddingProviderConfig,
    data_path: &Path,
) -> Result<Arc<dyn EmbeddingService + Send + Sync>, ScrivenerError> {
    match config {
        EmbeddingProviderConfig::Local {
            model, cache_dir, ..
        } => {
            if model.trim().is_empty() {
                return Err(ScrivenerError::Config(
                    "embedding.model must not be empty".to_string(),
                ));
            }
            let cache_dir = cache_dir.as_ref().map(|dir| data_path.join(dir));
            let service = LocalEmbeddingService::new(EmbeddingConfig {
                model: model.clone(),
                cache_dir,
            });
            if !service.is_available() {
                warn!("Embedding model not available; consistency scoring will fail");
            }
            Ok(Arc::new(service))
        }
        EmbeddingProviderConfig::Disabled => {
            info!("Embedding provider disabled");
            Ok(Arc::new(NoopEmbeddingService::new()))
        }
    }
}
