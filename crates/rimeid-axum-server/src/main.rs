#![doc = include_str!("../README.md")]

mod server;

use anyhow::Context;
use clap::Parser;
use server::config::{CliArgs, ServerConfig};
use server::routes::{AppState, router};
use server::telemetry::init_tracing;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    init_tracing();

    let state = AppState::try_from(&config)?;
    let app = router(state);

    let listener = TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    tracing::info!(
        "serving IDs for node {} on {} (epoch {}ms)",
        config.node_id,
        config.addr,
        config.epoch.as_millis()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("service shut down successfully");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("received SIGTERM signal");
        },
    }

    tracing::info!("shutdown signal received, terminating gracefully...");
}
