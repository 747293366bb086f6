//! Unit tests for the scan scheduler

use std::sync::Arc;

use cryptoscan::core::http::AppState;
use cryptoscan::core::scheduler::{ScanScheduler, SchedulerError};
use cryptoscan::metrics::Metrics;
use cryptoscan::scanner::{ScanOptions, Scanner};
use cryptoscan::services::{StaticMarketDataProvider, Timeframe};
use cryptoscan::signals::SetupEngine;

fn state() -> AppState {
    let symbols = vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()];
    let provider = StaticMarketDataProvider::demo(&symbols, Timeframe::M15, 120);
    let options = ScanOptions {
        symbols,
        ..ScanOptions::default()
    };
    let scanner = Scanner::new(Arc::new(provider), SetupEngine::default(), options);
    let metrics = Arc::new(Metrics::new().unwrap());
    AppState::new(Arc::new(scanner), metrics, "test")
}

#[test]
fn test_zero_interval_disables_scheduler() {
    assert!(matches!(
        ScanScheduler::new(state(), 0),
        Err(SchedulerError::Disabled)
    ));
}

#[tokio::test]
async fn test_start_and_stop() {
    let scheduler = ScanScheduler::new(state(), 30).unwrap();
    assert_eq!(scheduler.interval_seconds(), 30);
    assert!(!scheduler.is_running().await);

    scheduler.start().await;
    assert!(scheduler.is_running().await);
    // second start is ignored
    scheduler.start().await;
    assert!(scheduler.is_running().await);

    scheduler.stop().await;
    assert!(!scheduler.is_running().await);
}

#[tokio::test]
async fn test_scheduler_refreshes_snapshot() {
    let state = state();
    let scheduler = ScanScheduler::new(state.clone(), 1).unwrap();
    scheduler.start().await;

    let mut refreshed = false;
    for _ in 0..40 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if state.snapshot.read().await.is_some() {
            refreshed = true;
            break;
        }
    }
    scheduler.stop().await;

    assert!(refreshed, "snapshot was not refreshed within 4s");
}
