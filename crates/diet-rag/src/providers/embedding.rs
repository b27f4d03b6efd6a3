//! Embedder trait for turning text into vectors

use async_trait::async_trait;

use crate::error::Result;

/// Capability: text → embedding vector
///
/// Implementations:
/// - `OllamaEmbedder`: Ollama server (`all-minilm`)
/// - `OnnxEmbedder`: local sentence-transformers ONNX export (`onnx` feature)
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate the embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embedding dimensions (384 for all-MiniLM-L6-v2)
    fn dimensions(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}
