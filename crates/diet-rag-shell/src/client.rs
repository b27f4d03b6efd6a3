//! HTTP client for the question answering backend

use diet_rag::{AnswerResponse, Error, QueryRequest, Result};
use reqwest::Client;
use serde_json::Value;

/// Default backend address
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// One-shot client for `POST /query`
///
/// Every call is an independent round trip; nothing from earlier questions
/// is kept or sent.
#[derive(Clone)]
pub struct QueryClient {
    client: Client,
    base_url: String,
}

impl QueryClient {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client around an existing reqwest client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Backend base URL, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask one question
    ///
    /// Any failure (unreachable backend, non-2xx status, unreadable body)
    /// comes back as [`Error::Transport`].
    pub async fn ask(&self, question: &str) -> Result<AnswerResponse> {
        let url = format!("{}/query", self.base_url);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&QueryRequest::new(question))
            .send()
            .await
            .map_err(|e| Error::transport(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::transport(format!(
                "{} ({})",
                error_detail(&body),
                status
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::transport(format!("malformed response: {}", e)))
    }
}

/// Pull `detail` out of an error body, falling back to the raw text
fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty response".to_string()
            } else {
                trimmed.to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail() {
        assert_eq!(error_detail(r#"{"detail":"boom"}"#), "boom");
        assert_eq!(error_detail("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_detail("  "), "empty response");
        assert_eq!(error_detail(r#"{"detail":42}"#), r#"{"detail":42}"#);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = QueryClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
