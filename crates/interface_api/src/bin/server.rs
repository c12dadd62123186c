//! Payly - Settlement API Server Binary
//!
//! This binary starts the HTTP API server for the settlement engine.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin payly-api
//!
//! # Run with environment variables
//! PAYLY_PORT=9000 PAYLY_SETTLEMENT__STRATEGY=minimum_transfers cargo run --bin payly-api
//! ```
//!
//! # Environment Variables
//!
//! * `PAYLY_HOST` - Server host (default: 0.0.0.0)
//! * `PAYLY_PORT` - Server port (default: 8080)
//! * `PAYLY_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `PAYLY_MAX_EXPENSES` - Largest expense list per request (default: 10000)
//! * `PAYLY_SETTLEMENT__SPLIT_POLICY` - tolerate, normalize, or reject (default: tolerate)
//! * `PAYLY_SETTLEMENT__STRATEGY` - greedy or minimum_transfers (default: greedy)
//! * `PAYLY_SETTLEMENT__TOLERANCE__MODE` - fixed or currency_precision (default: fixed)
//! * `PAYLY_SETTLEMENT__TOLERANCE__EPSILON` - dust threshold for fixed mode (default: 0.01)

use anyhow::Context;
use interface_api::{config::ApiConfig, create_router, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration values are invalid
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let (config, load_error) = load_config();

    init_tracing(&config.log_level);

    if let Some(err) = load_error {
        tracing::warn!(error = %err, "Invalid environment configuration, using defaults");
    }

    tracing::info!(
        host = %config.host,
        port = %config.port,
        split_policy = ?config.settlement.split_policy,
        strategy = ?config.settlement.strategy,
        tolerance = ?config.settlement.tolerance,
        "Starting Payly Settlement API Server"
    );

    config.validate().context("invalid configuration")?;
    let state = AppState::new(config.clone()).context("invalid settlement configuration")?;
    let app = create_router(state);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables.
///
/// Falls back to defaults when the environment cannot be parsed; the error is
/// returned alongside so it can be logged once tracing is up.
fn load_config() -> (ApiConfig, Option<config::ConfigError>) {
    match ApiConfig::from_env() {
        Ok(config) => (config, None),
        Err(err) => {
            let mut config = ApiConfig::default();
            if let Ok(level) = std::env::var("RUST_LOG") {
                config.log_level = level;
            }
            (config, Some(err))
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
