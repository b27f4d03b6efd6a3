//! diet-rag: retrieval-augmented question answering with source attribution
//!
//! A question is embedded, the nearest documents are fetched from a Pinecone
//! index, stuffed into a single prompt and answered by an Ollama-served
//! model. The answer comes back with the metadata of every document used.

pub mod config;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::{Answer, RetrievalQa};
pub use types::{
    document::{Metadata, RetrievedDocument},
    query::{Query, QueryRequest},
    response::{AnswerResponse, ErrorResponse},
};
