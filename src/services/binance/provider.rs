//! Binance spot market data provider

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::client::BinanceClient;
use super::messages::closed_candles;
use crate::indicators::series::build_series;
use crate::models::candle::Candle;
use crate::models::scanner::TickerMetadata;
use crate::services::cache::TtlCache;
use crate::services::market_data::{MarketDataError, MarketDataProvider, Timeframe};

type CandleKey = (String, Timeframe, usize);

pub struct BinanceMarketDataProvider {
    client: BinanceClient,
    candles: TtlCache<CandleKey, Vec<Candle>>,
    tickers: TtlCache<(), HashMap<String, TickerMetadata>>,
}

impl BinanceMarketDataProvider {
    pub fn new(client: BinanceClient, cache_ttl: Duration) -> Self {
        Self {
            client,
            candles: TtlCache::new(cache_ttl),
            tickers: TtlCache::new(cache_ttl),
        }
    }

    pub fn client(&self) -> &BinanceClient {
        &self.client
    }

    async fn ticker_map(&self) -> Result<HashMap<String, TickerMetadata>, MarketDataError> {
        if let Some(cached) = self.tickers.get(&()).await {
            debug!(count = cached.len(), "ticker cache hit");
            return Ok(cached);
        }

        let mut map = HashMap::new();
        for ticker in self.client.all_tickers_24hr().await? {
            match ticker.to_metadata() {
                Ok(meta) => {
                    map.insert(meta.symbol.clone(), meta);
                }
                Err(e) => warn!(symbol = %ticker.symbol, error = %e, "skipping malformed ticker"),
            }
        }
        self.tickers.insert((), map.clone()).await;
        Ok(map)
    }
}

#[async_trait]
impl MarketDataProvider for BinanceMarketDataProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let key = (symbol.to_string(), timeframe, limit);
        if let Some(cached) = self.candles.get(&key).await {
            debug!(symbol, %timeframe, "candle cache hit");
            return Ok(cached);
        }

        let klines = self.client.klines(symbol, timeframe, limit).await?;
        let candles = closed_candles(&klines)?;
        build_series(&candles).map_err(|source| MarketDataError::InvalidCandles {
            symbol: symbol.to_string(),
            source,
        })?;

        self.candles.insert(key, candles.clone()).await;
        Ok(candles)
    }

    async fn get_tickers(&self, symbols: &[String]) -> Result<Vec<TickerMetadata>, MarketDataError> {
        let map = self.ticker_map().await?;
        Ok(symbols.iter().filter_map(|s| map.get(s).cloned()).collect())
    }

    async fn get_ticker(&self, symbol: &str) -> Result<TickerMetadata, MarketDataError> {
        if let Some(meta) = self.ticker_map().await.ok().and_then(|m| m.get(symbol).cloned()) {
            return Ok(meta);
        }
        self.client.ticker_24hr(symbol).await?.to_metadata()
    }

    async fn health_check(&self) -> bool {
        match self.client.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "binance health check failed");
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "binance"
    }
}
