//! Application state for the RAG server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::pipeline::RetrievalQa;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Question answering pipeline, built once
    qa: RetrievalQa,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Build the production pipeline from configuration
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing RAG application state...");
        let qa = RetrievalQa::from_config(&config).await?;
        Ok(Self::with_pipeline(config, qa))
    }

    /// Wrap an already constructed pipeline
    pub fn with_pipeline(config: RagConfig, qa: RetrievalQa) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                qa,
                ready: RwLock::new(true),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the QA pipeline
    pub fn qa(&self) -> &RetrievalQa {
        &self.inner.qa
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
