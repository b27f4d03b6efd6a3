//! Provider abstractions for the three external collaborators
//!
//! The pipeline only sees `Embedder`, `Retriever` and `Generator`; the
//! concrete Ollama, Pinecone and ONNX clients are chosen from config.

pub mod embedding;
pub mod http;
pub mod llm;
pub mod ollama;
pub mod pinecone;
pub mod retriever;

#[cfg(feature = "onnx")]
pub mod onnx;

pub use embedding::Embedder;
pub use llm::Generator;
pub use retriever::{Retriever, Candidate};
