use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

mod api;
mod config;
mod events;
mod model;
mod runner;
mod simulation;
mod state;
mod trials;

#[cfg(test)]
mod tests;

use config::AppConfig;
use events::EventHub;
pub(crate) use state::{AppState, RunnerState};
use trials::TrialPool;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fabric_durability=info,tower_http=info".into()),
        )
        .init();

    info!("fabric-durability v{} starting up", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!(
        "Configuration loaded: port={}, workers={}, batch_size={}, seed={:?}",
        config.port,
        config.effective_workers(),
        config.effective_batch_size(),
        config.seed
    );

    let pool = Arc::new(TrialPool::new(config.effective_workers())?);
    let batch_size = config.effective_batch_size();
    let event_hub = EventHub::new(config.event_capacity);
    let state = Arc::new(AppState::new(config.clone(), event_hub));

    let runner = tokio::spawn(runner::run(Arc::clone(&state), pool, batch_size));
    *state.runner_task.lock().await = Some(runner);

    let app = api::router(Arc::clone(&state));

    let bind_addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Waiting for the current trial batch to finish");
    state.shutdown.cancel();
    let runner = state.runner_task.lock().await.take();
    if let Some(handle) = runner {
        if let Err(e) = handle.await {
            error!("Trial runner terminated abnormally: {}", e);
        }
    }

    info!("fabric-durability shut down cleanly");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { warn!("Received Ctrl+C, shutting down..."); },
        () = terminate => { warn!("Received SIGTERM, shutting down..."); },
    }
}
