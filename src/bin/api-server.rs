//! Cryptoscan API Server
//!
//! HTTP API serving the ranked scanner snapshot, per-pair detail and ad-hoc
//! evaluation. A cron scheduler refreshes the snapshot in the background.

use std::sync::Arc;

use cryptoscan::config::ScannerConfig;
use cryptoscan::core::http::{start_server, AppState};
use cryptoscan::core::scheduler::ScanScheduler;
use cryptoscan::logging;
use cryptoscan::metrics::Metrics;
use cryptoscan::scanner::{ScanOptions, Scanner};
use cryptoscan::services::build_provider;
use cryptoscan::signals::SetupEngine;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load environment variables from .env if present
    dotenv().ok();

    let config = ScannerConfig::from_env()?;
    logging::init_logging_for(&config.environment);

    info!("Starting Cryptoscan API Server");
    info!(environment = %config.environment, "Environment");
    info!(
        data_source = ?config.data_source,
        timeframe = %config.timeframe,
        symbols = config.symbols.len(),
        "Scanner configuration"
    );

    let metrics = Arc::new(Metrics::new()?);
    let provider = build_provider(&config)?;
    let scanner = Scanner::new(provider, SetupEngine::default(), ScanOptions::from(&config))
        .with_metrics(metrics.clone());
    let state = AppState::new(Arc::new(scanner), metrics, config.environment.clone());

    let scheduler = match ScanScheduler::new(state.clone(), config.scan_interval_seconds) {
        Ok(scheduler) => {
            scheduler.start().await;
            Some(scheduler)
        }
        Err(e) => {
            warn!(error = %e, "Scheduler not started, snapshot refreshes on demand only");
            None
        }
    };

    let port = config.port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(state, port).await {
            error!(error = %e, "HTTP server error");
        }
    });

    // Graceful shutdown
    info!("API server started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    if let Some(scheduler) = scheduler {
        scheduler.stop().await;
    }
    info!("API server stopped");

    Ok(())
}
