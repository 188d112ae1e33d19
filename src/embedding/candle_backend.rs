//! Candle-based sentence embedding backend.
//!
//! Loads a BERT-family sentence-transformer (all-MiniLM-L6-v2 by default)
//! from the HuggingFace Hub and produces mean-pooled, L2-normalized vectors,
//! matching what `sentence-transformers` returns for the same checkpoint.

use std::path::PathBuf;

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{LayerNorm, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// BERT position embeddings cap the sequence length.
const MAX_SEQUENCE_TOKENS: usize = 512;

/// Paths to downloaded model files from HuggingFace Hub.
pub struct ModelFiles {
    pub config_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub weights_path: PathBuf,
}

/// Download (or reuse cached) model files for `repo_id`.
///
/// Performs synchronous I/O; call from `spawn_blocking` or before the
/// runtime starts serving requests. When `cache_dir` is set the hub cache
/// lives there instead of `~/.cache/huggingface/hub/`.
pub fn download_model(repo_id: &str, cache_dir: Option<PathBuf>) -> Result<ModelFiles> {
    let api = match cache_dir {
        Some(dir) => hf_hub::api::sync::ApiBuilder::new()
            .with_cache_dir(dir)
            .build(),
        None => hf_hub::api::sync::Api::new(),
    }
    .context("Failed to initialize HuggingFace Hub API")?;
    let repo = api.model(repo_id.to_string());

    Ok(ModelFiles {
        config_path: repo
            .get("config.json")
            .context("Failed to download config.json")?,
        tokenizer_path: repo
            .get("tokenizer.json")
            .context("Failed to download tokenizer.json")?,
        weights_path: repo
            .get("model.safetensors")
            .context("Failed to download model.safetensors")?,
    })
}

/// Pick a GPU when one is compiled in and usable, else CPU.
///
/// BERT needs layer-norm; a GPU backend without that kernel is skipped.
pub fn select_device() -> Device {
    #[cfg(target_os = "macos")]
    {
        if let Ok(device) = Device::new_metal(0) {
            if supports_layer_norm(&device) {
                tracing::info!("Using Metal GPU for embeddings");
                return device;
            }
            tracing::warn!("Metal GPU lacks layer-norm support, falling back to CPU");
        }
    }
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            if supports_layer_norm(&device) {
                tracing::info!("Using CUDA GPU for embeddings");
                return device;
            }
            tracing::warn!("CUDA GPU lacks layer-norm support, falling back to CPU");
        }
    }
    tracing::info!("Using CPU for embeddings");
    Device::Cpu
}

#[allow(dead_code)]
fn supports_layer_norm(device: &Device) -> bool {
    let smoke_test = || -> candle_core::Result<()> {
        let ln = LayerNorm::new(
            Tensor::ones(4, DType::F32, device)?,
            Tensor::zeros(4, DType::F32, device)?,
            1e-5,
        );
        ln.forward(&Tensor::zeros((1, 4), DType::F32, device)?)?;
        Ok(())
    };
    smoke_test().is_ok()
}

/// Sentence embedder over a candle `BertModel`.
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    hidden_size: usize,
}

impl BertEmbedder {
    /// Load weights, config and tokenizer from downloaded files.
    pub fn new(files: &ModelFiles, device: Device) -> Result<Self> {
        let config_str =
            std::fs::read_to_string(&files.config_path).context("Failed to read model config")?;
        let config: BertConfig =
            serde_json::from_str(&config_str).context("Failed to parse BERT config")?;
        let hidden_size = config.hidden_size;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;

        // SAFETY: the safetensors file is memory-mapped read-only and the hub
        // cache does not rewrite files in place.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&files.weights_path], DType::F32, &device)
                .context("Failed to load model weights")?
        };
        let model = BertModel::load(vb, &config).context("Failed to construct BERT model")?;

        Ok(Self {
            model,
            tokenizer,
            device,
            hidden_size,
        })
    }

    /// Width of the produced vectors.
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Embed a batch of texts, one unit-length vector per input.
    pub fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.iter().map(String::as_str).collect::<Vec<_>>(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let rows = encodings.len();
        let cols = encodings.first().map(|e| e.get_ids().len()).unwrap_or(0);

        let mut ids = Vec::with_capacity(rows * cols);
        let mut mask = Vec::with_capacity(rows * cols);
        let mut type_ids = Vec::with_capacity(rows * cols);
        for encoding in &encodings {
            ids.extend_from_slice(encoding.get_ids());
            mask.extend_from_slice(encoding.get_attention_mask());
            type_ids.extend_from_slice(encoding.get_type_ids());
        }

        let ids = Tensor::from_vec(ids, (rows, cols), &self.device)?;
        let mask = Tensor::from_vec(mask, (rows, cols), &self.device)?;
        let type_ids = Tensor::from_vec(type_ids, (rows, cols), &self.device)?;

        // [rows, cols, hidden]
        let hidden = self.model.forward(&ids, &type_ids, Some(&mask))?;

        // Mean over non-padding tokens.
        let weights = mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let pooled = hidden
            .broadcast_mul(&weights)?
            .sum(1)?
            .broadcast_div(&weights.sum(1)?)?;

        let norms = pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
        pooled
            .broadcast_div(&norms)?
            .to_vec2::<f32>()
            .context("Failed to convert embeddings to Vec")
    }
}
