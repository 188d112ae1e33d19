//! Runtime configuration.
//!
//! Priority: `{data_path}/scrivener.toml` > `SCRIVENER_CONFIG` env (JSON) > defaults.
//! A file or env value that fails to parse is logged and skipped.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::embedding::EmbeddingProviderConfig;
use crate::llm::HttpLlmClientConfig;
use crate::services::ComparisonPolicy;

pub const CONFIG_FILE_NAME: &str = "scrivener.toml";
pub const CONFIG_ENV_VAR: &str = "SCRIVENER_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrivenerConfig {
    pub llm: LlmConfig,
    pub embedding: EmbeddingProviderConfig,
    pub consistency: ConsistencyConfig,
}

/// `[llm]`: the OpenAI-compatible chat endpoint shared by all generative stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let http = HttpLlmClientConfig::default();
        Self {
            endpoint: http.endpoint,
            model: http.model,
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_secs: http.timeout_secs,
        }
    }
}

impl LlmConfig {
    /// Non-blank API key from `api_key_env`, if set.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn client_config(&self, api_key: Option<String>) -> HttpLlmClientConfig {
        HttpLlmClientConfig {
            endpoint: self.endpoint.clone(),
            api_key,
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Which session store backs the consistency tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStoreKind {
    /// Unbounded map.
    #[default]
    Memory,
    /// Bounded cache with idle eviction.
    Cached,
}

/// `[consistency]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyConfig {
    pub policy: ComparisonPolicy,
    pub store: SessionStoreKind,
    pub cache_capacity: u64,
    pub idle_secs: u64,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            policy: ComparisonPolicy::default(),
            store: SessionStoreKind::default(),
            cache_capacity: 10_000,
            idle_secs: 6 * 60 * 60,
        }
    }
}

/// Load configuration for `data_path`, reading `SCRIVENER_CONFIG` from the
/// process environment.
pub fn load_config(data_path: &Path) -> ScrivenerConfig {
    load_config_with_env(data_path, std::env::var(CONFIG_ENV_VAR).ok())
}

pub fn load_config_with_env(data_path: &Path, env_json: Option<String>) -> ScrivenerConfig {
    let config_path = data_path.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<ScrivenerConfig>(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    return config;
                }
                Err(e) => {
                    warn!(
                        "Failed to parse {}: {}. Ignoring file.",
                        config_path.display(),
                        e
                    );
                }
            },
            Err(e) => {
                warn!(
                    "Failed to read {}: {}. Ignoring file.",
                    config_path.display(),
                    e
                );
            }
        }
    }

    if let Some(json) = env_json {
        match serde_json::from_str::<ScrivenerConfig>(&json) {
            Ok(config) => {
                info!("Loaded config from {} env", CONFIG_ENV_VAR);
                return config;
            }
            Err(e) => {
                warn!("Failed to parse {}: {}. Using defaults.", CONFIG_ENV_VAR, e);
            }
        }
    }

    ScrivenerConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_and_env_yield_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let config = load_config_with_env(dir.path(), None);
        assert_eq!(config, ScrivenerConfig::default());
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.consistency.policy, ComparisonPolicy::RunningAverage);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
[llm]
model = "llama-3.3-70b-versatile"

[embedding]
provider = "disabled"

[consistency]
policy = "full_history"
store = "cached"
idle_secs = 60
"#,
        )
        .expect("write config");

        let config = load_config_with_env(dir.path(), None);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.timeout_secs, 180);
        assert_eq!(config.embedding, EmbeddingProviderConfig::Disabled);
        assert_eq!(config.consistency.policy, ComparisonPolicy::FullHistory);
        assert_eq!(config.consistency.store, SessionStoreKind::Cached);
        assert_eq!(config.consistency.idle_secs, 60);
        assert_eq!(config.consistency.cache_capacity, 10_000);
    }

    #[test]
    fn test_file_takes_priority_over_env() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[llm]\nmodel = \"from-file\"\n",
        )
        .expect("write config");

        let config = load_config_with_env(
            dir.path(),
            Some(r#"{"llm": {"model": "from-env"}}"#.to_string()),
        );
        assert_eq!(config.llm.model, "from-file");
    }

    #[test]
    fn test_env_json_used_without_file() {
        let dir = TempDir::new().expect("tempdir");
        let config = load_config_with_env(
            dir.path(),
            Some(r#"{"consistency": {"policy": "full_history"}}"#.to_string()),
        );
        assert_eq!(config.consistency.policy, ComparisonPolicy::FullHistory);
    }

    #[test]
    fn test_malformed_sources_fall_back_to_defaults() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[llm\nmodel = ").expect("write");
        let config = load_config_with_env(dir.path(), Some("{not json".to_string()));
        assert_eq!(config, ScrivenerConfig::default());
    }

    #[test]
    fn test_client_config_carries_key() {
        let llm = LlmConfig::default();
        let http = llm.client_config(Some("secret".into()));
        assert_eq!(http.api_key.as_deref(), Some("secret"));
        assert_eq!(http.endpoint, llm.endpoint);
    }
}
