//! Configuration for the RAG service
//!
//! Loaded once at startup: defaults, then an optional TOML file, then
//! environment overrides (a `.env` file in the working directory is read
//! first). Nothing here changes after the service is constructed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main RAG service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Ollama/LLM configuration
    pub llm: LlmConfig,
    /// Vector index configuration
    pub vector_db: VectorDbConfig,
    /// Retrieval chain configuration
    pub retrieval: RetrievalConfig,
}

impl RagConfig {
    /// Load configuration: defaults, optional TOML file, then environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Ok(env_file) = dotenv::dotenv() {
            tracing::debug!("Loaded environment from {}", env_file.display());
        }

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse TOML configuration; missing sections and keys take defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("PINECONE_API_KEY") {
            self.vector_db.api_key = Some(key);
        }
        if let Some(name) = lookup("PINECONE_INDEX_NAME") {
            self.vector_db.index_name = name;
        }
        if let Some(host) = lookup("PINECONE_INDEX_HOST") {
            self.vector_db.index_host = Some(host);
        }
        if let Some(namespace) = lookup("PINECONE_NAMESPACE") {
            self.vector_db.namespace = Some(namespace);
        }
        if let Some(url) = lookup("OLLAMA_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup("DIET_RAG_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(model) = lookup("DIET_RAG_EMBED_MODEL") {
            self.embeddings.model = model;
        }
        if let Some(host) = lookup("DIET_RAG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DIET_RAG_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid DIET_RAG_PORT '{}': {}", port, e)))?;
        }
        if let Some(top_k) = lookup("DIET_RAG_TOP_K") {
            self.retrieval.top_k = top_k
                .parse()
                .map_err(|e| Error::Config(format!("Invalid DIET_RAG_TOP_K '{}': {}", top_k, e)))?;
        }
        Ok(())
    }

    /// Check invariants that the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        self.retrieval.validate()?;

        if self.vector_db.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(Error::Config(
                "Pinecone API key is missing (set PINECONE_API_KEY)".to_string(),
            ));
        }
        if self.vector_db.index_name.is_empty() && self.vector_db.index_host.is_none() {
            return Err(Error::Config(
                "Either vector_db.index_name or vector_db.index_host must be set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            enable_cors: true,
        }
    }
}

/// Which embedding implementation to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Ollama `/api/embeddings`
    #[default]
    Ollama,
    /// Local ONNX runtime (requires the `onnx` feature)
    Onnx,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend to use
    pub backend: EmbeddingBackend,
    /// Ollama model tag (`all-minilm` packages all-MiniLM-L6-v2)
    pub model: String,
    /// HuggingFace repository of the ONNX export used by the `onnx` backend
    pub onnx_model: String,
    /// Embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
    /// Maximum sequence length (ONNX backend)
    pub max_length: usize,
    /// Cache directory for downloaded models
    pub cache_dir: PathBuf,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Ollama,
            model: "all-minilm".to_string(),
            onnx_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            max_length: 256,
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("diet-rag")
                .join("models"),
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL, shared by generation and the Ollama embedder
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Sampling temperature; `None` leaves the model default
    pub temperature: Option<f32>,
    /// Request timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            temperature: None,
            timeout_secs: 120,
            max_retries: 0,
        }
    }
}

/// Vector index (Pinecone) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Index name
    pub index_name: String,
    /// Data-plane host; resolved from the control plane when unset
    pub index_host: Option<String>,
    /// Namespace within the index (`None` = default namespace)
    pub namespace: Option<String>,
    /// API key; never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Control-plane base URL
    pub control_plane_url: String,
    /// Value for the `X-Pinecone-API-Version` header
    pub api_version: String,
    /// Metadata key holding the document text
    pub text_key: String,
    /// Request timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            index_name: "nutrition-index".to_string(),
            index_host: None,
            namespace: None,
            api_key: None,
            control_plane_url: "https://api.pinecone.io".to_string(),
            api_version: "2024-07".to_string(),
            text_key: "text".to_string(),
            timeout_secs: 30,
            max_retries: 0,
        }
    }
}

/// How candidates are selected from the index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Plain top-K similarity
    #[default]
    Similarity,
    /// Maximal marginal relevance over `fetch_k` candidates
    Mmr,
}

/// How retrieved documents are combined into the prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainType {
    /// All documents in one prompt context
    #[default]
    Stuff,
}

/// Retrieval chain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Retrieval mode
    pub search_type: SearchType,
    /// Number of documents handed to the LLM (K)
    pub top_k: usize,
    /// Candidates fetched before MMR selection
    pub fetch_k: usize,
    /// MMR balance: 1.0 = pure relevance, 0.0 = pure diversity
    pub lambda_mult: f32,
    /// Prompt-combination strategy
    pub chain_type: ChainType,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            search_type: SearchType::Similarity,
            top_k: 4,
            fetch_k: 20,
            lambda_mult: 0.5,
            chain_type: ChainType::Stuff,
        }
    }
}

impl RetrievalConfig {
    /// Validate retrieval parameters
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be at least 1".to_string()));
        }
        if self.search_type == SearchType::Mmr {
            if self.fetch_k < self.top_k {
                return Err(Error::Config(format!(
                    "retrieval.fetch_k ({}) must be >= top_k ({})",
                    self.fetch_k, self.top_k
                )));
            }
            if !(0.0..=1.0).contains(&self.lambda_mult) {
                return Err(Error::Config(format!(
                    "retrieval.lambda_mult ({}) must be within 0.0..=1.0",
                    self.lambda_mult
                )));
            }
        }
        Ok(())
    }
}
