//! Retrieval QA pipeline: embed → retrieve → stuff → generate
//!
//! A `RetrievalQa` is built once and is immutable afterwards; concurrent
//! requests share it without locking.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{ChainType, EmbeddingBackend, RagConfig, RetrievalConfig, SearchType};
use crate::error::{Error, Result};
use crate::generation::{OllamaClient, PromptBuilder};
use crate::providers::ollama::{OllamaEmbedder, OllamaLlm};
use crate::providers::pinecone::PineconeRetriever;
use crate::providers::{Embedder, Generator, Retriever};
use crate::retrieval::mmr_select;
use crate::types::{AnswerResponse, Query, RetrievedDocument};

/// Generated answer and the exact documents that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Generated text
    pub text: String,
    /// Documents passed to generation, in retrieval order
    pub documents: Vec<RetrievedDocument>,
}

impl Answer {
    /// Shape for transport: answer plus metadata only
    pub fn into_response(self) -> AnswerResponse {
        AnswerResponse::from_documents(self.text, &self.documents)
    }
}

/// Question answering over a vector index
pub struct RetrievalQa {
    embedder: Arc<dyn Embedder>,
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn Generator>,
    retrieval: RetrievalConfig,
}

impl RetrievalQa {
    /// Assemble a pipeline from injected collaborators
    pub fn new(
        embedder: Arc<dyn Embedder>,
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn Generator>,
        retrieval: RetrievalConfig,
    ) -> Result<Self> {
        retrieval.validate()?;
        Ok(Self {
            embedder,
            retriever,
            generator,
            retrieval,
        })
    }

    /// Build the production collaborators described by `config`
    pub async fn from_config(config: &RagConfig) -> Result<Self> {
        let ollama = Arc::new(OllamaClient::new(&config.llm)?);

        let embedder: Arc<dyn Embedder> = match config.embeddings.backend {
            EmbeddingBackend::Ollama => Arc::new(OllamaEmbedder::from_client(
                Arc::clone(&ollama),
                &config.embeddings,
            )),
            #[cfg(feature = "onnx")]
            EmbeddingBackend::Onnx => Arc::new(
                crate::providers::onnx::OnnxEmbedder::new(&config.embeddings).await?,
            ),
            #[cfg(not(feature = "onnx"))]
            EmbeddingBackend::Onnx => {
                return Err(Error::Config(
                    "ONNX embedding backend selected but the onnx feature is not enabled. \
                     Rebuild with --features onnx"
                        .to_string(),
                ));
            }
        };

        let retriever: Arc<dyn Retriever> =
            Arc::new(PineconeRetriever::connect(&config.vector_db).await?);
        let generator: Arc<dyn Generator> = Arc::new(OllamaLlm::from_client(ollama));

        tracing::info!(
            "Retrieval QA ready (embedder: {}, retriever: {}, generator: {} / {})",
            embedder.name(),
            retriever.name(),
            generator.name(),
            generator.model()
        );

        Self::new(embedder, retriever, generator, config.retrieval.clone())
    }

    /// Retrieval settings in effect
    pub fn retrieval(&self) -> &RetrievalConfig {
        &self.retrieval
    }

    /// Answer a question
    ///
    /// Any collaborator failure is returned as a single error tagged with
    /// the stage it happened in; there is no partial answer.
    pub async fn answer(&self, query: &Query) -> Result<Answer> {
        let start = Instant::now();

        let embedding = self
            .embedder
            .embed(query.as_str())
            .await
            .map_err(|e| reclassify(e, Error::Embedding))?;

        let documents = self
            .retrieve(&embedding)
            .await
            .map_err(|e| reclassify(e, Error::Retrieval))?;

        let prompt = match self.retrieval.chain_type {
            ChainType::Stuff => PromptBuilder::build_stuff_prompt(query.as_str(), &documents),
        };

        let text = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| reclassify(e, Error::Generation))?;

        tracing::info!(
            "Answered in {}ms using {} documents",
            start.elapsed().as_millis(),
            documents.len()
        );

        Ok(Answer { text, documents })
    }

    /// Fetch at most K documents in the order generation will see them
    async fn retrieve(&self, embedding: &[f32]) -> Result<Vec<RetrievedDocument>> {
        let k = self.retrieval.top_k;
        let mut documents = match self.retrieval.search_type {
            SearchType::Similarity => self.retriever.similarity_search(embedding, k).await?,
            SearchType::Mmr => {
                let candidates = self
                    .retriever
                    .search_with_vectors(embedding, self.retrieval.fetch_k)
                    .await?;
                mmr_select(embedding, candidates, k, self.retrieval.lambda_mult)
            }
        };

        if documents.len() > k {
            tracing::warn!(
                "Retriever {} returned {} documents for k={}, keeping the first {}",
                self.retriever.name(),
                documents.len(),
                k,
                k
            );
            documents.truncate(k);
        }
        Ok(documents)
    }
}

/// Tag an error with the stage it came from, keeping its message
fn reclassify(err: Error, stage: fn(String) -> Error) -> Error {
    let tagged = stage(String::new());
    if std::mem::discriminant(&err) == std::mem::discriminant(&tagged) {
        err
    } else {
        stage(err.message().to_string())
    }
}
