//! Cron-based scheduler that refreshes the scanner snapshot

use crate::core::http::AppState;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler disabled: interval_seconds is 0")]
    Disabled,
    #[error("invalid cron expression '{expr}': {message}")]
    InvalidCron { expr: String, message: String },
}

/// Cron expression firing every `interval_seconds`.
///
/// Cron format: second minute hour day month weekday. Intervals of a minute
/// or more round down to whole minutes.
pub fn interval_to_cron(interval_seconds: u64) -> Result<String, SchedulerError> {
    match interval_seconds {
        0 => Err(SchedulerError::Disabled),
        s if s >= 60 => Ok(format!("0 */{} * * * *", s / 60)),
        s => Ok(format!("*/{} * * * * *", s)),
    }
}

/// Periodically runs a full scan and stores it in the shared state
pub struct ScanScheduler {
    state: AppState,
    schedule: Schedule,
    interval_seconds: u64,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl ScanScheduler {
    /// Create a new scheduler
    ///
    /// # Arguments
    /// * `state` - Shared application state holding the scanner and snapshot
    /// * `interval_seconds` - Scan interval in seconds (0 = disabled)
    pub fn new(state: AppState, interval_seconds: u64) -> Result<Self, SchedulerError> {
        let cron_expr = interval_to_cron(interval_seconds)?;
        let schedule = Schedule::from_str(&cron_expr).map_err(|e| SchedulerError::InvalidCron {
            expr: cron_expr.clone(),
            message: e.to_string(),
        })?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            symbols = state.scanner.options().symbols.len(),
            "ScanScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            state,
            schedule,
            interval_seconds,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub fn interval_seconds(&self) -> u64 {
        self.interval_seconds
    }

    /// Start the scheduler. A second call while running is a no-op.
    pub async fn start(&self) {
        let mut slot = self.handle.write().await;
        if slot.is_some() {
            warn!("ScanScheduler: already running");
            return;
        }

        let state = self.state.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("ScanScheduler: started, waiting for cron schedule...");

            loop {
                let next_tick = schedule.upcoming(chrono::Utc).next();
                match next_tick {
                    Some(next_tick) => {
                        let now = chrono::Utc::now();
                        if next_tick > now {
                            let duration = (next_tick - now).to_std().unwrap_or_default();
                            tokio::time::sleep(duration).await;
                        }
                    }
                    None => {
                        tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                        continue;
                    }
                }

                match state.refresh().await {
                    Ok(report) => info!(
                        ranked = report.pairs.len(),
                        failed = report.failed.len(),
                        duration_ms = report.duration_ms,
                        "ScanScheduler: snapshot refreshed"
                    ),
                    // keep serving the previous snapshot
                    Err(e) => error!(error = %e, "ScanScheduler: scan failed"),
                }
            }
        });

        *slot = Some(handle);
        info!("ScanScheduler: started successfully");
    }

    /// Stop the scheduler
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("ScanScheduler: stopped");
        }
    }

    /// Check if the scheduler is running
    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }
}
