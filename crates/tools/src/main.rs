//! Tools server binary.
//!
//! Serves the JSON-RPC tools endpoint backed by the commerce adapter.
//! Configuration comes from `shopfront.toml` and `SHOPFRONT_*` environment
//! variables; with no access token configured and dummy responses enabled,
//! the server answers with deterministic mock envelopes.

use std::sync::Arc;

use anyhow::Result;
use shopfront_commerce::CommerceApi;
use shopfront_core::config::{AppConfig, LoadOptions};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load(LoadOptions::default())?;
    let api = Arc::new(CommerceApi::new(&config.commerce)?);

    let address =
        format!("{}:{}", config.tools_server.bind_address, config.tools_server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(bind_address = %address, dummy_responses = config.commerce.dummy_responses, "tools server listening");

    axum::serve(listener, shopfront_tools::router(api))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
