//! Terminal shell for the diet-rag service
//!
//! Reads questions, forwards each one to `POST /query` and prints the answer
//! with its source metadata. No conversation state is kept between questions.

pub mod client;
pub mod render;

pub use client::{QueryClient, DEFAULT_API_URL};

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Words that end an interactive session
const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

/// What the loop should do after a line of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep reading
    Continue,
    /// Stop the session
    Exit,
}

/// Question loop driver
pub struct Shell {
    client: QueryClient,
    spinner: bool,
}

impl Shell {
    /// Create a shell talking to `client`
    pub fn new(client: QueryClient) -> Self {
        Self {
            client,
            spinner: true,
        }
    }

    /// Show or hide the "Thinking..." spinner
    pub fn with_spinner(mut self, enabled: bool) -> Self {
        self.spinner = enabled;
        self
    }

    /// Handle one line of input
    ///
    /// Blank lines are ignored without contacting the backend. Anything
    /// else is sent exactly as typed. Backend failures are rendered and
    /// never end the session.
    pub async fn handle<W: Write>(&self, line: &str, out: &mut W) -> io::Result<Step> {
        let command = line.trim();
        if command.is_empty() {
            return Ok(Step::Continue);
        }
        if EXIT_WORDS.iter().any(|w| command.eq_ignore_ascii_case(w)) {
            return Ok(Step::Exit);
        }

        let progress = self.spinner.then(thinking_spinner);
        let result = self.client.ask(line).await;
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        match result {
            Ok(response) => render::render_answer(out, &response)?,
            Err(e) => {
                tracing::debug!("Query failed: {}", e);
                render::render_error(out, &e)?;
            }
        }
        writeln!(out)?;
        Ok(Step::Continue)
    }
}

fn thinking_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Thinking...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::Arc;

    /// Serve `router` on an ephemeral port and return its base URL
    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn shell(base_url: String) -> Shell {
        Shell::new(QueryClient::new(base_url)).with_spinner(false)
    }

    async fn run(shell: &Shell, line: &str) -> (Step, String) {
        let mut out = Vec::new();
        let step = shell.handle(line, &mut out).await.unwrap();
        let text = console::strip_ansi_codes(&String::from_utf8(out).unwrap()).into_owned();
        (step, text)
    }

    #[tokio::test]
    async fn test_backend_error_rendered_without_answer() {
        let router = Router::new().route(
            "/query",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"detail": "boom"})),
                )
            }),
        );
        let shell = shell(spawn(router).await);

        let (step, text) = run(&shell, "What is protein?").await;

        assert_eq!(step, Step::Continue);
        assert!(text.contains("Error communicating with backend"));
        assert!(text.contains("boom"));
        assert!(!text.contains("Answer:"));
    }

    #[tokio::test]
    async fn test_each_question_sent_independently() {
        let received: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let router = Router::new().route(
            "/query",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    sink.lock().push(body);
                    Json(json!({"answer": "ok", "sources": []}))
                }
            }),
        );
        let shell = shell(spawn(router).await);

        run(&shell, "What is protein?").await;
        run(&shell, "How much fibre per day?").await;

        let received = received.lock();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0], json!({"query": "What is protein?"}));
        assert_eq!(received[1], json!({"query": "How much fibre per day?"}));
    }

    #[tokio::test]
    async fn test_question_sent_as_typed() {
        let received: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let router = Router::new().route(
            "/query",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    sink.lock().push(body);
                    Json(json!({"answer": "ok", "sources": []}))
                }
            }),
        );
        let shell = shell(spawn(router).await);

        run(&shell, "  What is protein? ").await;

        assert_eq!(*received.lock(), vec![json!({"query": "  What is protein? "})]);
    }

    #[tokio::test]
    async fn test_malformed_body_rendered_as_error() {
        let router = Router::new().route("/query", post(|| async { "not json" }));
        let shell = shell(spawn(router).await);

        let (step, text) = run(&shell, "What is protein?").await;

        assert_eq!(step, Step::Continue);
        assert!(text.contains("Error communicating with backend: malformed response"));
        assert!(!text.contains("Answer:"));
    }

    #[tokio::test]
    async fn test_answer_with_sources_rendered() {
        let router = Router::new().route(
            "/query",
            post(|| async {
                Json(json!({
                    "answer": "Protein is a macronutrient needed for muscle repair.",
                    "sources": [{"source": "doc1.pdf"}]
                }))
            }),
        );
        let shell = shell(spawn(router).await);

        let (_, text) = run(&shell, "What is protein?").await;

        assert!(text.contains("Protein is a macronutrient needed for muscle repair."));
        assert!(text.contains("Source 1:"));
        assert!(text.contains("doc1.pdf"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_rendered() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let shell = shell(format!("http://{}", addr));

        let (step, text) = run(&shell, "What is protein?").await;

        assert_eq!(step, Step::Continue);
        assert!(text.contains("Error communicating with backend"));
    }

    #[tokio::test]
    async fn test_blank_and_exit_skip_backend() {
        let shell = shell("http://127.0.0.1:9".to_string());

        assert_eq!(run(&shell, "   ").await, (Step::Continue, String::new()));
        assert_eq!(run(&shell, "quit").await.0, Step::Exit);
        assert_eq!(run(&shell, "EXIT").await.0, Step::Exit);
    }
}
