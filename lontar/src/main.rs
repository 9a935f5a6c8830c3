use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lontar::api::{create_router, AppState};
use lontar::config::Config;
use lontar::embeddings::EmbeddingProvider;
use lontar::index::EmbeddingIndex;
use lontar::llm::LlmProvider;
use lontar::processing::{run_clean, run_embed};

#[derive(Parser)]
#[command(name = "lontar")]
#[command(about = "Self-hostable retrieval chatbot over chat-export logs")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the chat HTTP service
    Serve {
        /// Path to the embedded chunk store
        #[arg(long, default_value = "conversation_embeddings.json")]
        store: PathBuf,
    },
    /// Clean a raw chat export into per-conversation session lists
    Clean {
        /// Raw chat export (conversation id -> message list)
        #[arg(long, default_value = "response.json")]
        input: PathBuf,
        /// Cleaned sessions output
        #[arg(long, default_value = "cleaned_conversations.json")]
        output: PathBuf,
    },
    /// Chunk and embed cleaned sessions into the chunk store
    Embed {
        /// Cleaned sessions produced by `clean`
        #[arg(long, default_value = "cleaned_conversations.json")]
        input: PathBuf,
        /// Embedded chunk store output
        #[arg(long, default_value = "conversation_embeddings.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lontar=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    match args.command {
        Command::Serve { store } => serve(config, store).await,
        Command::Clean { input, output } => {
            let summary = run_clean(&input, &output, &config.ingest)?;
            tracing::info!(
                conversations = summary.conversations,
                sessions = summary.sessions,
                "clean job done"
            );
            Ok(())
        }
        Command::Embed { input, output } => {
            let embeddings = EmbeddingProvider::new(&config.embeddings)?;
            let summary = run_embed(&input, &output, &config.ingest, &embeddings).await?;
            tracing::info!(chunks = summary.chunks, batches = summary.batches, "embed job done");
            Ok(())
        }
    }
}

async fn serve(config: Config, store: PathBuf) -> anyhow::Result<()> {
    tracing::info!("Loading chunk store from {}...", store.display());
    let index = EmbeddingIndex::load(&store)?;
    if index.is_empty() {
        tracing::warn!("Chunk store is empty - every query will take the escalation path");
    } else {
        tracing::info!("Loaded {} chunks", index.len());
    }

    let embeddings = EmbeddingProvider::new(&config.embeddings)?;

    let llm = LlmProvider::new(&config.llm);
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - every reply will be the fallback apology");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, index, embeddings, llm);
    let app = create_router(state);

    tracing::info!("Lontar starting on http://{}", addr);
    tracing::info!("  Chat endpoint: http://{}/chat", addr);
    tracing::info!("  Health check:  http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
