//! Primary provider with a health-checked fallback.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::models::candle::Candle;
use crate::models::scanner::TickerMetadata;
use crate::services::market_data::{MarketDataError, MarketDataProvider, Timeframe};

/// Routes every call to `primary` while its last health check passed, and to
/// `fallback` otherwise. The health result is reused for `check_interval`.
pub struct FallbackMarketDataProvider {
    primary: Arc<dyn MarketDataProvider>,
    fallback: Arc<dyn MarketDataProvider>,
    check_interval: Duration,
    last_check: RwLock<Option<(bool, Instant)>>,
}

impl FallbackMarketDataProvider {
    pub fn new(
        primary: Arc<dyn MarketDataProvider>,
        fallback: Arc<dyn MarketDataProvider>,
        check_interval: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            check_interval,
            last_check: RwLock::new(None),
        }
    }

    /// Cached primary health, refreshed once the interval has passed.
    pub async fn primary_healthy(&self) -> bool {
        if let Some((healthy, at)) = *self.last_check.read().await {
            if at.elapsed() < self.check_interval {
                return healthy;
            }
        }

        let healthy = self.primary.health_check().await;
        let mut last = self.last_check.write().await;
        let previous = last.map(|(h, _)| h);
        if previous != Some(healthy) {
            if healthy {
                info!(provider = self.primary.name(), "primary market data source healthy");
            } else {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    "primary market data source unhealthy, using fallback"
                );
            }
        }
        *last = Some((healthy, Instant::now()));
        healthy
    }

    /// Forget the cached health result.
    pub async fn reset(&self) {
        *self.last_check.write().await = None;
    }

    async fn active(&self) -> &Arc<dyn MarketDataProvider> {
        if self.primary_healthy().await {
            &self.primary
        } else {
            &self.fallback
        }
    }
}

#[async_trait]
impl MarketDataProvider for FallbackMarketDataProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        self.active().await.get_candles(symbol, timeframe, limit).await
    }

    async fn get_tickers(&self, symbols: &[String]) -> Result<Vec<TickerMetadata>, MarketDataError> {
        self.active().await.get_tickers(symbols).await
    }

    async fn get_ticker(&self, symbol: &str) -> Result<TickerMetadata, MarketDataError> {
        self.active().await.get_ticker(symbol).await
    }

    async fn health_check(&self) -> bool {
        self.primary_healthy().await || self.fallback.health_check().await
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}
