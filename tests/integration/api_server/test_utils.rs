//! Test utilities for API server integration tests

use std::sync::Arc;

use axum_test::TestServer;
use cryptoscan::core::http::{create_router, AppState};
use cryptoscan::metrics::Metrics;
use cryptoscan::models::candle::Candle;
use cryptoscan::models::scanner::TickerMetadata;
use cryptoscan::scanner::{ScanOptions, Scanner};
use cryptoscan::services::{StaticMarketDataProvider, Timeframe};
use cryptoscan::signals::SetupEngine;

pub const SYMBOLS: [&str; 3] = ["AAAUSDT", "BBBUSDT", "CCCUSDT"];

/// 25 flat bars followed by a breakout on four times the volume.
pub fn breakout_candles() -> Vec<Candle> {
    let mut candles: Vec<Candle> = (1..=25)
        .map(|i| Candle::flat(i * 900, 100.0, 100.0))
        .collect();
    candles.push(Candle::new(26 * 900, 100.0, 105.0, 100.0, 105.0, 400.0));
    candles
}

pub fn flat_candles(count: i64) -> Vec<Candle> {
    (1..=count).map(|i| Candle::flat(i * 900, 10.0, 50.0)).collect()
}

/// Test helper for API server integration tests
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub metrics: Arc<Metrics>,
    pub state: AppState,
}

impl TestApiServer {
    pub async fn new() -> Self {
        let provider = StaticMarketDataProvider::new()
            .with_pair(TickerMetadata::new("AAAUSDT", 10.0, -1.5, 3e6), flat_candles(40))
            .with_ticker(TickerMetadata::new("BBBUSDT", 1.0, 2.0, 1e6))
            .with_pair(TickerMetadata::new("CCCUSDT", 105.0, 5.0, 2e6), breakout_candles());

        let options = ScanOptions {
            symbols: SYMBOLS.iter().map(|s| s.to_string()).collect(),
            timeframe: Timeframe::M15,
            ..ScanOptions::default()
        };

        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let scanner = Scanner::new(Arc::new(provider), SetupEngine::default(), options)
            .with_metrics(metrics.clone());
        let state = AppState::new(Arc::new(scanner), metrics.clone(), "test");

        let app = create_router(state.clone());
        let server = TestServer::new(app).expect("start test server");

        Self {
            server,
            metrics,
            state,
        }
    }
}
