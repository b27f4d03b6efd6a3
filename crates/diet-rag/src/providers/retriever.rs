//! Retriever trait for nearest-neighbour search against the vector index

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RetrievedDocument;

/// A retrieved document together with its stored vector
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The matched document
    pub document: RetrievedDocument,
    /// Stored embedding, when the index returned it
    pub embedding: Option<Vec<f32>>,
}

/// Capability: embedding → ordered list of the most similar stored documents
///
/// Implementations:
/// - `PineconeRetriever`: Pinecone serverless/pod index
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to `k` documents, most similar first
    async fn similarity_search(&self, embedding: &[f32], k: usize) -> Result<Vec<RetrievedDocument>>;

    /// Return up to `k` candidates, most similar first, with stored vectors where available
    ///
    /// Used by maximal-marginal-relevance selection. The default has no
    /// vectors to offer.
    async fn search_with_vectors(&self, embedding: &[f32], k: usize) -> Result<Vec<Candidate>> {
        Ok(self
            .similarity_search(embedding, k)
            .await?
            .into_iter()
            .map(|document| Candidate {
                document,
                embedding: None,
            })
            .collect())
    }

    /// Provider name for logging
    fn name(&self) -> &str;
}
