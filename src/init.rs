//! Shared initialization logic for MCP and CLI modes.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{load_config, ScrivenerConfig, SessionStoreKind};
use crate::embedding::{create_embedding_service, EmbeddingService};
use crate::llm::{HttpLlmClient, LlmClient, NoopLlmClient};
use crate::services::{ConsistencyTracker, Orchestrator};
use crate::session::{CachedSessionStore, InMemorySessionStore, SessionStore};

/// Application context holding the configured pipeline.
///
/// Shared between MCP server and CLI commands.
pub struct AppContext {
    pub data_path: PathBuf,
    pub config: ScrivenerConfig,
    pub llm: Arc<dyn LlmClient>,
    pub embedding_service: Arc<dyn EmbeddingService + Send + Sync>,
    pub orchestrator: Arc<Orchestrator>,
}

/// Data path priority: explicit path > SCRIVENER_DATA_PATH env > ./.scrivener (if exists) > ~/.scrivener
pub fn resolve_data_path(explicit_path: Option<PathBuf>) -> PathBuf {
    explicit_path
        .or_else(|| std::env::var("SCRIVENER_DATA_PATH").ok().map(PathBuf::from))
        .or_else(|| {
            let local_path = Path::new(".scrivener");
            if local_path.is_dir() {
                Some(local_path.to_path_buf())
            } else {
                None
            }
        })
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".scrivener"))
                .unwrap_or_else(|| PathBuf::from(".scrivener"))
        })
}

impl AppContext {
    /// Initialize application context from the resolved data path.
    pub async fn new(explicit_path: Option<PathBuf>) -> Result<Self> {
        let data_path = resolve_data_path(explicit_path);
        tracing::info!("Using data path: {}", data_path.display());

        let config = load_config(&data_path);
        Self::from_config(data_path, config).await
    }

    pub async fn from_config(data_path: PathBuf, config: ScrivenerConfig) -> Result<Self> {
        // Generative backend
        let llm: Arc<dyn LlmClient> = match config.llm.api_key() {
            Some(key) => {
                let client = HttpLlmClient::new(config.llm.client_config(Some(key)))?;
                tracing::info!("LLM backend: {} ({})", client.model(), config.llm.endpoint);
                Arc::new(client)
            }
            None => {
                tracing::warn!(
                    "{} not set; generative stages will pass input through",
                    config.llm.api_key_env
                );
                Arc::new(NoopLlmClient::new())
            }
        };

        // Embedding model (blocking download + load)
        tracing::info!("Initializing embedding model...");
        let embedding_config = config.embedding.clone();
        let model_path = data_path.clone();
        let embedding_service = tokio::task::spawn_blocking(move || {
            create_embedding_service(&embedding_config, &model_path)
        })
        .await??;

        if embedding_service.is_available() {
            tracing::info!(
                "Embedding model loaded ({} dimensions)",
                embedding_service.dimensions()
            );
        } else {
            tracing::warn!("Embedding model not available");
        }

        // Session store
        let store: Arc<dyn SessionStore> = match config.consistency.store {
            SessionStoreKind::Memory => Arc::new(InMemorySessionStore::new()),
            SessionStoreKind::Cached => Arc::new(CachedSessionStore::new(
                config.consistency.cache_capacity,
                Duration::from_secs(config.consistency.idle_secs),
            )),
        };

        let tracker = Arc::new(ConsistencyTracker::new(
            embedding_service.clone(),
            store,
            config.consistency.policy,
            Duration::from_secs(config.embedding.timeout_secs()),
        ));
        let orchestrator = Arc::new(Orchestrator::new(llm.clone(), tracker));

        Ok(Self {
            data_path,
            config,
            llm,
            embedding_service,
            orchestrator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingProviderConfig;

    #[test]
    fn test_explicit_data_path_wins() {
        let path = resolve_data_path(Some(PathBuf::from("/tmp/scrivener-explicit")));
        assert_eq!(path, PathBuf::from("/tmp/scrivener-explicit"));
    }

    #[tokio::test]
    async fn test_context_with_disabled_embedding() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let mut config = ScrivenerConfig::default();
        config.embedding = EmbeddingProviderConfig::Disabled;
        config.llm.api_key_env = "SCRIVENER_TEST_KEY_THAT_IS_NEVER_SET".into();

        let ctx = AppContext::from_config(dir.path().to_path_buf(), config)
            .await
            .expect("context");
        assert!(!ctx.embedding_service.is_available());
        assert!(!ctx.llm.is_configured());
    }
}
