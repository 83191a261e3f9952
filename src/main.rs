// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bank-Recon API Server
//!
//! Ingests bank statements, finance paid lists and Tally ledgers, and
//! reconciles them against each other.

use bank_recon::{config::Config, db::Db, services::ReconcileLocks, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Bank-Recon API");

    // Open the database and apply migrations
    let db = Db::connect(&config.database_url).await?;

    // Per-account locks shared by every reconciliation run
    let reconcile_locks = ReconcileLocks::default();

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        reconcile_locks,
    });

    // Build router
    let app = bank_recon::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bank_recon=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
