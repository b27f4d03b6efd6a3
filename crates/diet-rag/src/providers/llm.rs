//! Generator trait for LLM text completion

use async_trait::async_trait;

use crate::error::Result;

/// Capability: composed prompt → generated answer text
///
/// Implementations:
/// - `OllamaLlm`: Ollama server (`llama3.2`)
#[async_trait]
pub trait Generator: Send + Sync {
    /// Complete the prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model being used
    fn model(&self) -> &str;
}
