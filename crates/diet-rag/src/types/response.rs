//! Response types for RAG queries

use serde::{Deserialize, Serialize};

use super::document::{Metadata, RetrievedDocument};

/// Answer with source attribution, as returned by `POST /query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// Generated answer
    pub answer: String,
    /// Metadata of the documents used, in retrieval order
    #[serde(default)]
    pub sources: Vec<Metadata>,
}

impl AnswerResponse {
    /// Build a response from the generated answer and the documents that fed it
    pub fn from_documents(answer: impl Into<String>, documents: &[RetrievedDocument]) -> Self {
        Self {
            answer: answer.into(),
            sources: documents.iter().map(|d| d.metadata.clone()).collect(),
        }
    }
}

/// Error body returned on any failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Failure description
    pub detail: String,
}
