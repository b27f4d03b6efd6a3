//! Pinecone vector index provider
//!
//! Read-only: the index is populated elsewhere. Each stored vector carries
//! its document text in the metadata key configured as `text_key`; the
//! remaining metadata keys become the document's attribution metadata.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::VectorDbConfig;
use crate::error::{Error, Result};
use crate::types::{Metadata, RetrievedDocument};

use super::http::{build_client, retry_request};
use super::retriever::{Candidate, Retriever};

/// Pinecone data-plane client implementing `Retriever`
pub struct PineconeRetriever {
    client: Client,
    /// Data-plane base URL (`https://<index-host>`)
    host: String,
    api_key: String,
    api_version: String,
    namespace: Option<String>,
    text_key: String,
    max_retries: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

#[derive(Debug, Deserialize)]
struct Match {
    id: String,
    #[serde(default)]
    values: Vec<f32>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

impl PineconeRetriever {
    /// Connect to the configured index, resolving its host if necessary
    pub async fn connect(config: &VectorDbConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("Pinecone API key is missing".to_string()))?;
        let client = build_client(config.timeout_secs)?;

        let host = match &config.index_host {
            Some(host) => host.clone(),
            None => describe_index_host(&client, config, &api_key).await?,
        };
        tracing::info!("Pinecone index '{}' at {}", config.index_name, host);

        Ok(Self::with_client(client, host, api_key, config))
    }

    /// Build a retriever for a known data-plane host
    pub fn with_client(client: Client, host: String, api_key: String, config: &VectorDbConfig) -> Self {
        Self {
            client,
            host: normalize_host(&host),
            api_key,
            api_version: config.api_version.clone(),
            namespace: config.namespace.clone().filter(|n| !n.is_empty()),
            text_key: config.text_key.clone(),
            max_retries: config.max_retries,
        }
    }

    /// Data-plane base URL
    pub fn host(&self) -> &str {
        &self.host
    }

    async fn query(&self, embedding: &[f32], top_k: usize, include_values: bool) -> Result<Vec<Match>> {
        let url = format!("{}/query", self.host);
        let url = url.as_str();
        let request = QueryRequest {
            vector: embedding,
            top_k,
            include_metadata: true,
            include_values,
            namespace: self.namespace.as_deref(),
        };
        let request = &request;

        retry_request(self.max_retries, "Pinecone query", || async move {
            let response = self
                .client
                .post(url)
                .header("Api-Key", &self.api_key)
                .header("X-Pinecone-API-Version", &self.api_version)
                .json(request)
                .send()
                .await
                .map_err(|e| Error::retrieval(format!("Pinecone query failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::retrieval(format!(
                    "Pinecone query failed ({}): {}",
                    status, body
                )));
            }

            let query_response: QueryResponse = response
                .json()
                .await
                .map_err(|e| Error::retrieval(format!("Failed to parse Pinecone response: {}", e)))?;

            Ok(query_response.matches)
        })
        .await
    }

    /// Convert matches to documents, keeping index order
    fn to_candidates(&self, matches: Vec<Match>) -> Vec<Candidate> {
        matches
            .into_iter()
            .filter_map(|m| {
                let id = m.id;
                let values = m.values;
                match split_text(m.metadata.unwrap_or_default(), &self.text_key) {
                    Some(document) => Some(Candidate {
                        document,
                        embedding: (!values.is_empty()).then_some(values),
                    }),
                    None => {
                        tracing::warn!(
                            "Match {} has no `{}` metadata key, skipping",
                            id,
                            self.text_key
                        );
                        None
                    }
                }
            })
            .collect()
    }
}

#[async_trait]
impl Retriever for PineconeRetriever {
    async fn similarity_search(&self, embedding: &[f32], k: usize) -> Result<Vec<RetrievedDocument>> {
        let matches = self.query(embedding, k, false).await?;
        Ok(self
            .to_candidates(matches)
            .into_iter()
            .map(|s| s.document)
            .collect())
    }

    async fn search_with_vectors(&self, embedding: &[f32], k: usize) -> Result<Vec<Candidate>> {
        let matches = self.query(embedding, k, true).await?;
        Ok(self.to_candidates(matches))
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}

/// Look up the data-plane host of an index through the control plane
async fn describe_index_host(client: &Client, config: &VectorDbConfig, api_key: &str) -> Result<String> {
    let url = format!(
        "{}/indexes/{}",
        config.control_plane_url.trim_end_matches('/'),
        config.index_name
    );

    let response = client
        .get(&url)
        .header("Api-Key", api_key)
        .header("X-Pinecone-API-Version", &config.api_version)
        .send()
        .await
        .map_err(|e| Error::retrieval(format!("Failed to describe index '{}': {}", config.index_name, e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::retrieval(format!(
            "Failed to describe index '{}' ({}): {}",
            config.index_name, status, body
        )));
    }

    let described: DescribeIndexResponse = response
        .json()
        .await
        .map_err(|e| Error::retrieval(format!("Failed to parse describe-index response: {}", e)))?;

    Ok(described.host)
}

/// Move the text entry out of `metadata`; `None` when it is absent or not a string
fn split_text(mut metadata: Metadata, text_key: &str) -> Option<RetrievedDocument> {
    match metadata.remove(text_key) {
        Some(serde_json::Value::String(text)) => Some(RetrievedDocument::new(text, metadata)),
        _ => None,
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
