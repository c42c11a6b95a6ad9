mod chat;
mod health;

use std::sync::Arc;

use anyhow::Result;
use shopfront_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use shopfront_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let workflow = Arc::new(shopfront_agent::build_workflow(&config)?);
    let app = chat::router(chat::AppState { workflow }).merge(health::router());

    let address = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        bind_address = %address,
        local_tools = config.commerce.local_tools,
        catalog_bypass = config.commerce.catalog_bypass,
        rag_ready = config.rag_ready(),
        "shopfront server started"
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("shopfront server stopping");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
