//! API routes for the RAG server

pub mod query;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::server::state::AppState;

/// Build the query and info routes
pub fn root_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::query_rag))
        .route("/info", get(info))
}

/// Service info endpoint
async fn info(State(state): State<AppState>) -> Json<Value> {
    let config = state.config();
    Json(json!({
        "name": "diet-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Nutrition question answering with source attribution",
        "models": {
            "embedding_backend": config.embeddings.backend,
            "embedding": config.embeddings.model,
            "llm": config.llm.model,
        },
        "index": {
            "name": config.vector_db.index_name,
            "namespace": config.vector_db.namespace,
        },
        "retrieval": {
            "search_type": state.qa().retrieval().search_type,
            "top_k": state.qa().retrieval().top_k,
            "chain_type": state.qa().retrieval().chain_type,
        },
        "endpoints": {
            "POST /query": "Answer a question with source metadata",
            "GET /health": "Liveness",
            "GET /ready": "Readiness",
            "GET /info": "This document"
        }
    }))
}
