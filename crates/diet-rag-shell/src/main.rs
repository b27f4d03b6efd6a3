//! Interactive terminal for asking nutrition questions
//!
//! Run with: cargo run -p diet-rag-shell -- --api-url http://127.0.0.1:8000

use clap::Parser;
use console::style;
use diet_rag_shell::{QueryClient, Shell, Step, DEFAULT_API_URL};
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Ask the diet-rag service questions from the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Backend base URL
    #[arg(long, env = "DIET_RAG_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Ask a single question and exit
    #[arg(short, long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diet_rag_shell=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let shell = Shell::new(QueryClient::new(args.api_url.as_str()));
    let mut stdout = io::stdout();

    if let Some(question) = args.question {
        shell.handle(&question, &mut stdout).await?;
        return Ok(());
    }

    println!("{}", style("Diet RAG").bold());
    println!("Backend: {}", args.api_url);
    println!("Type a question, or 'exit' to quit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", style(">").cyan().bold());
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        if shell.handle(&line, &mut stdout).await? == Step::Exit {
            break;
        }
    }

    Ok(())
}
