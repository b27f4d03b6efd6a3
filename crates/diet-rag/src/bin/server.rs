//! RAG Server binary
//!
//! Run with: cargo run -p diet-rag --bin diet-rag-server

use clap::Parser;
use diet_rag::{config::RagConfig, generation::OllamaClient, server::RagServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Nutrition question-answering service
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "DIET_RAG_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diet_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = RagConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding: {:?} / {}", config.embeddings.backend, config.embeddings.model);
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - Index: {}", config.vector_db.index_name);
    tracing::info!(
        "  - Retrieval: {:?}, k = {}",
        config.retrieval.search_type,
        config.retrieval.top_k
    );

    let ollama = OllamaClient::new(&config.llm)?;
    if !ollama.health_check().await {
        tracing::warn!(
            "Ollama not reachable at {}; queries will fail until it is up",
            ollama.base_url()
        );
    }

    let server = RagServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /query - Ask a question");
    println!("  GET  /info  - Service info");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
