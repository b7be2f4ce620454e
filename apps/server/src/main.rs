//! HTTP host for the offline-first field QA sync engine.

mod api;
mod config;
mod error;
mod probe;
mod state;

use fieldsync_core::sync::SyncTrigger;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", err);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = ServerConfig::from_env()?;
    tracing::info!("Using data directory {}", config.data_dir.display());

    let state = state::build_state(&config)?;
    if state.orchestrator.init().await? {
        tracing::warn!("Recovered from an interrupted sync");
    }
    state.watcher.initialize().await;

    let probe = config
        .probe_interval
        .map(|interval| probe::spawn_probe(state.clone(), interval));

    let startup = state.clone();
    tokio::spawn(async move {
        if let Err(err) = startup
            .orchestrator
            .attempt_sync_with_trigger(false, SyncTrigger::Startup)
            .await
        {
            tracing::warn!("Startup sync failed: {}", err);
        }
    });

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!("Listening on {}", config.listen_addr);
    axum::serve(listener, api::router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(probe) = probe {
        probe.abort();
    }
    state.watcher.teardown().await;
    Ok(())
}
