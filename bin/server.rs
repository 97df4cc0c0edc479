// Receipt Processor - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use receipt_processor::api::{router, AppState};
use receipt_processor::config::DEFAULT_LOG_FILTER;
use receipt_processor::{InMemoryReceiptStore, RuleEngine, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = ServerConfig::from_env()?;

    // Create shared state
    let state = AppState::new(Arc::new(InMemoryReceiptStore::new()), RuleEngine::new());
    let app = router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "receipt processor listening");

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
