//! Core types for the RAG service

pub mod document;
pub mod query;
pub mod response;

pub use document::{Metadata, RetrievedDocument};
pub use query::{Query, QueryRequest};
pub use response::{AnswerResponse, ErrorResponse};
