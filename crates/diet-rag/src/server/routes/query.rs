//! Query endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{AnswerResponse, Query, QueryRequest};

/// POST /query - answer a question with source attribution
pub async fn query_rag(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>> {
    let Json(request) = payload.map_err(|rejection| Error::input(rejection.body_text()))?;
    let query = Query::try_from(request)?;

    tracing::info!("Query: \"{}\"", query.as_str());

    match state.qa().answer(&query).await {
        Ok(answer) => {
            let response = answer.into_response();
            tracing::info!("Query answered with {} sources", response.sources.len());
            Ok(Json(response))
        }
        Err(e) => {
            tracing::error!("Query failed: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RagConfig, RetrievalConfig};
    use crate::pipeline::tests::{protein_embedder, FakeGenerator, FakeRetriever};
    use crate::pipeline::RetrievalQa;
    use crate::server::routes::root_routes;
    use crate::types::RetrievedDocument;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(retriever: FakeRetriever, generator: FakeGenerator) -> Router {
        let qa = RetrievalQa::new(
            protein_embedder(),
            Arc::new(retriever),
            Arc::new(generator),
            RetrievalConfig {
                top_k: 1,
                ..RetrievalConfig::default()
            },
        )
        .unwrap();
        root_routes().with_state(AppState::with_pipeline(RagConfig::default(), qa))
    }

    async fn post(app: Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::post("/query")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_query_success() {
        let app = app(
            FakeRetriever::returning(vec![RetrievedDocument::with_source(
                "Protein is a macronutrient.",
                "doc1.pdf",
            )]),
            FakeGenerator::answering("Protein is a macronutrient needed for muscle repair."),
        );

        let (status, body) = post(app, r#"{"query":"What is protein?"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "answer": "Protein is a macronutrient needed for muscle repair.",
                "sources": [{"source": "doc1.pdf"}]
            })
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_is_single_detail() {
        let generator = FakeGenerator {
            answer: String::new(),
            fail: Some("ollama: model \"llama3.2\" not found".to_string()),
            prompts: Mutex::new(Vec::new()),
        };
        let app = app(FakeRetriever::returning(Vec::new()), generator);

        let (status, body) = post(app, r#"{"query":"What is protein?"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let object = body.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object["detail"]
            .as_str()
            .unwrap()
            .contains("model \"llama3.2\" not found"));
        assert!(!object.contains_key("answer"));
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_500() {
        let retriever = FakeRetriever {
            documents: Vec::new(),
            fail: Some("index unreachable".to_string()),
            requested: Mutex::new(Vec::new()),
        };
        let app = app(retriever, FakeGenerator::answering("unused"));

        let (status, body) = post(app, r#"{"query":"What is protein?"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"detail": "Retrieval failed: index unreachable"}));
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_pipeline() {
        let generator = FakeGenerator::answering("unused");
        let app = app(FakeRetriever::returning(Vec::new()), generator);

        let (status, body) = post(app, r#"{"query":"   "}"#).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("must not be empty"));
    }

    #[tokio::test]
    async fn test_missing_field_rejected() {
        let app = app(
            FakeRetriever::returning(Vec::new()),
            FakeGenerator::answering("unused"),
        );

        let (status, body) = post(app, r#"{"question":"What is protein?"}"#).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }
}
