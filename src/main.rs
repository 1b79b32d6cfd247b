//! castlist — actor/movie catalog microservice, main entry point
//!
//! Serves the JSON REST API for actors, movies, and cast credits, and the
//! buzz endpoints backed by an external chat-completion API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use castlist::config::{self, Args};
use castlist::services::chat_client::ChatClient;
use castlist::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "castlist=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting castlist v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", args.database.display());

    let toml_config = match &args.config {
        Some(path) => config::load_toml(path)?,
        None => Default::default(),
    };

    let pool = castlist::db::init_database_pool(&args.database)
        .await
        .context("failed to initialize database")?;
    info!("Database connection established");

    let chat = match config::resolve_chat_config(&toml_config) {
        Some(chat_config) => Some(Arc::new(
            ChatClient::new(chat_config.endpoint, chat_config.api_key, chat_config.model)
                .context("failed to create chat client")?,
        )),
        None => None,
    };

    let state = AppState::new(pool, chat);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("castlist listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
