//! Error types for the RAG service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG service errors
///
/// Every variant carries the original failure message. The HTTP boundary
/// only distinguishes bad input from everything else.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing, empty or malformed query
    #[error("Invalid input: {0}")]
    Input(String),

    /// Embedding service failed
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Vector index failed
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// Language model failed
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Network or protocol failure talking to the query service
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a retrieval error
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The original message, without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Input(msg)
            | Self::Embedding(msg)
            | Self::Retrieval(msg)
            | Self::Generation(msg)
            | Self::Transport(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg,
        }
    }

    /// HTTP status for this error kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Input(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Embedding(_)
            | Self::Retrieval(_)
            | Self::Generation(_)
            | Self::Transport(_)
            | Self::Config(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}
