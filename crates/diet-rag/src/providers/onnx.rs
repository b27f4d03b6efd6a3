//! Local ONNX embedding provider
//!
//! Runs the sentence-transformers ONNX export of `embeddings.onnx_model`
//! (all-MiniLM-L6-v2 by default, 384 dimensions) with mean pooling and L2
//! normalisation. Model and tokenizer are downloaded into
//! `embeddings.cache_dir` on first use.

use async_trait::async_trait;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tokenizers::Tokenizer;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

use super::embedding::Embedder;

/// ONNX-based text embedder
pub struct OnnxEmbedder {
    inner: Arc<Mutex<OnnxModel>>,
    dimensions: usize,
}

struct OnnxModel {
    session: Session,
    tokenizer: Tokenizer,
    max_length: usize,
    dimensions: usize,
}

impl OnnxEmbedder {
    /// Load (downloading if needed) the configured model
    pub async fn new(config: &EmbeddingConfig) -> Result<Self> {
        tracing::info!("Initializing ONNX embedder with model: {}", config.onnx_model);

        let cache_dir = config.cache_dir.join(config.onnx_model.replace('/', "--"));
        std::fs::create_dir_all(&cache_dir)
            .map_err(|e| Error::Config(format!("Failed to create cache directory: {}", e)))?;

        let model_path = cache_dir.join("model.onnx");
        let tokenizer_path = cache_dir.join("tokenizer.json");

        if !model_path.exists() {
            download(&config.onnx_model, "onnx/model.onnx", &model_path).await?;
        }
        if !tokenizer_path.exists() {
            download(&config.onnx_model, "tokenizer.json", &tokenizer_path).await?;
        }

        let session = Session::builder()
            .map_err(|e| Error::embedding(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::embedding(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| Error::embedding(format!("Failed to set threads: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| Error::embedding(format!("Failed to load model: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::embedding(format!("Failed to load tokenizer: {}", e)))?;

        tracing::info!("ONNX embedder initialized");

        Ok(Self {
            inner: Arc::new(Mutex::new(OnnxModel {
                session,
                tokenizer,
                max_length: config.max_length,
                dimensions: config.dimensions,
            })),
            dimensions: config.dimensions,
        })
    }
}

#[async_trait]
impl Embedder for OnnxEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        tokio::task::spawn_blocking(move || inner.lock().embed_one(&text))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "onnx"
    }
}

impl OnnxModel {
    fn embed_one(&mut self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::embedding(format!("Tokenization failed: {}", e)))?;

        let len = encoding.get_ids().len().min(self.max_length);
        let input_ids: Vec<i64> = encoding.get_ids()[..len].iter().map(|&v| v as i64).collect();
        let attention_mask: Vec<i64> = encoding.get_attention_mask()[..len]
            .iter()
            .map(|&v| v as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding.get_type_ids()[..len].iter().map(|&v| v as i64).collect();

        let shape = vec![1usize, len];
        let input_ids_tensor = Tensor::from_array((shape.clone(), input_ids.into_boxed_slice()))
            .map_err(|e| Error::embedding(format!("Input tensor creation failed: {}", e)))?;
        let attention_mask_tensor =
            Tensor::from_array((shape.clone(), attention_mask.clone().into_boxed_slice()))
                .map_err(|e| Error::embedding(format!("Attention mask tensor creation failed: {}", e)))?;
        let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))
            .map_err(|e| Error::embedding(format!("Token type tensor creation failed: {}", e)))?;

        let inputs = vec![
            ("input_ids", input_ids_tensor.into_dyn()),
            ("attention_mask", attention_mask_tensor.into_dyn()),
            ("token_type_ids", token_type_ids_tensor.into_dyn()),
        ];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| Error::embedding(format!("Inference failed: {}", e)))?;

        let output_iter: Vec<_> = outputs.iter().collect();
        let output = output_iter
            .iter()
            .find(|(name, _)| *name == "last_hidden_state")
            .or_else(|| output_iter.first())
            .map(|(_, v)| v)
            .ok_or_else(|| Error::embedding("No output tensor"))?;

        let (tensor_shape, tensor_data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::embedding(format!("Failed to extract tensor: {}", e)))?;
        let dims: Vec<usize> = tensor_shape.iter().map(|&d| d as usize).collect();
        let hidden_size = dims.get(2).copied().unwrap_or(self.dimensions);

        mean_pool(tensor_data, &attention_mask, hidden_size)
    }
}

/// Attention-masked mean over token states, then L2 normalisation
fn mean_pool(hidden: &[f32], attention_mask: &[i64], hidden_size: usize) -> Result<Vec<f32>> {
    if hidden_size == 0 || hidden.len() < attention_mask.len() * hidden_size {
        return Err(Error::embedding(format!(
            "Model output has {} values, expected {} tokens of width {}",
            hidden.len(),
            attention_mask.len(),
            hidden_size
        )));
    }

    let mut sum = vec![0.0f32; hidden_size];
    let mut count = 0.0f32;

    for (j, &mask) in attention_mask.iter().enumerate() {
        if mask == 0 {
            continue;
        }
        let row = &hidden[j * hidden_size..(j + 1) * hidden_size];
        for (acc, value) in sum.iter_mut().zip(row) {
            *acc += value;
        }
        count += 1.0;
    }

    if count > 0.0 {
        for val in &mut sum {
            *val /= count;
        }
    }

    let norm: f32 = sum.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in &mut sum {
            *val /= norm;
        }
    }
    Ok(sum)
}

/// Fetch one file of a HuggingFace repository
async fn download(repo: &str, file: &str, path: &Path) -> Result<()> {
    let url = format!("https://huggingface.co/{}/resolve/main/{}", repo, file);
    tracing::info!("Downloading {}", url);

    let response = reqwest::get(&url)
        .await
        .map_err(|e| Error::embedding(format!("Failed to download {}: {}", file, e)))?;

    if !response.status().is_success() {
        return Err(Error::embedding(format!(
            "Download of {} failed: HTTP {}",
            file,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::embedding(format!("Failed to read {}: {}", file, e)))?;

    std::fs::write(path, &bytes)
        .map_err(|e| Error::embedding(format!("Failed to save {}: {}", path.display(), e)))?;

    tracing::info!("Downloaded {} ({} bytes)", file, bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_pool_ignores_padding_and_normalizes() {
        // two tokens of width 2, second one masked out
        let hidden = [3.0, 4.0, 100.0, 100.0];
        let pooled = mean_pool(&hidden, &[1, 0], 2).unwrap();
        assert!((pooled[0] - 0.6).abs() < 1e-6);
        assert!((pooled[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_mean_pool_rejects_pooled_output() {
        // already pooled [1, 384] output read as per-token states
        let hidden = vec![0.1f32; 384];
        let err = mean_pool(&hidden, &[1, 1, 1], 384).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }
}
