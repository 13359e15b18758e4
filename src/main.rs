//! indego-history server entry point.
//!
//! Bootstraps the snapshot schema, schedules ingestion, and serves the
//! REST API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use indego_history::api;
use indego_history::app_state::AppState;
use indego_history::config::ServiceConfig;
use indego_history::persistence::PostgresPersistence;
use indego_history::service::StationService;
use indego_history::service::scheduler::spawn_ingest_schedule;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config =
        ServiceConfig::from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(addr = %config.listen_addr, "starting indego-history");

    // Build persistence layer; schema bootstrap failure is fatal
    let store = PostgresPersistence::connect(&config)
        .await
        .context("database bootstrap failed")?;

    // Build service layer
    let station_service = Arc::new(StationService::from_config(store, &config)?);
    let _ingest_task = spawn_ingest_schedule(
        Arc::clone(&station_service),
        Duration::from_secs(config.ingest_interval_secs),
    );

    // Build router
    let app = api::build_app(AppState::new(station_service, &config), &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
