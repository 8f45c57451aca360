use std::sync::Arc;

use anyhow::{Context, Result};
use calbridge_provider_google::GoogleCalendar;
use calbridge_server::{Bridge, ServerConfig, logging, routes, singleton};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = ServerConfig::load().context("Failed to load configuration")?;
    logging::init(config.log_format);

    // Ensure only one instance is running
    let lock = singleton::acquire_lock()?;

    let provider = GoogleCalendar::new(&config.google_api_base)
        .map_err(|e| anyhow::anyhow!("Invalid google_api_base: {e}"))?;
    let state = Arc::new(Bridge::new(Arc::new(provider), config.bridge_settings()));

    let app = routes::app(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        %addr,
        lock = %lock.path().display(),
        webhook = config.webhook_address.as_deref().unwrap_or("disabled"),
        "calbridge-server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("calbridge-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
}
