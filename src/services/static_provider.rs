//! In-memory market data, used offline and as a fallback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::models::candle::Candle;
use crate::models::scanner::TickerMetadata;
use crate::services::market_data::{MarketDataError, MarketDataProvider, Timeframe};

/// Close time of the last generated demo candle.
const DEMO_ANCHOR: i64 = 1_700_000_000;

/// Fixed tickers and candle histories. Timeframe is ignored: every symbol has
/// one history that is served for all intervals.
#[derive(Default)]
pub struct StaticMarketDataProvider {
    tickers: Vec<TickerMetadata>,
    candles: HashMap<String, Vec<Candle>>,
    unhealthy: AtomicBool,
}

impl StaticMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(mut self, ticker: TickerMetadata, candles: Vec<Candle>) -> Self {
        self.candles.insert(ticker.symbol.clone(), candles);
        self.with_ticker(ticker)
    }

    /// Ticker without candles; `get_candles` fails for it.
    pub fn with_ticker(mut self, ticker: TickerMetadata) -> Self {
        self.tickers.retain(|t| t.symbol != ticker.symbol);
        self.tickers.push(ticker);
        self
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::Relaxed);
    }

    /// Deterministic synthetic market for `symbols`, `count` candles each.
    pub fn demo(symbols: &[String], timeframe: Timeframe, count: usize) -> Self {
        symbols
            .iter()
            .enumerate()
            .fold(Self::new(), |provider, (i, symbol)| {
                let candles = demo_candles(i, timeframe, count);
                let ticker = demo_ticker(symbol, &candles, timeframe);
                provider.with_pair(ticker, candles)
            })
    }
}

fn demo_candles(seed: usize, timeframe: Timeframe, count: usize) -> Vec<Candle> {
    let step = timeframe.seconds();
    let base = 10.0 * (seed as f64 + 1.0).powi(2);
    let phase = seed as f64 * 0.7;
    let drift = if seed % 2 == 0 { 0.0005 } else { -0.0003 };

    let mut prev_close = base;
    (0..count)
        .map(|i| {
            let t = i as f64;
            let close = base * (1.0 + 0.03 * (t / 12.0 + phase).sin() + drift * t);
            let open = prev_close;
            let high = open.max(close) * 1.002;
            let low = open.min(close) * 0.998;
            let volume = 1_000.0 * (1.5 + (t / 5.0 + phase).sin());
            prev_close = close;
            let time = DEMO_ANCHOR - (count - 1 - i) as i64 * step;
            Candle::new(time, open, high, low, close, volume)
        })
        .collect()
}

fn demo_ticker(symbol: &str, candles: &[Candle], timeframe: Timeframe) -> TickerMetadata {
    let per_day = (86_400 / timeframe.seconds()).max(1) as usize;
    let window = &candles[candles.len().saturating_sub(per_day)..];

    let last = window.last().map(|c| c.close).unwrap_or_default();
    let first = window.first().map(|c| c.open).unwrap_or_default();
    let change = if first != 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    };

    TickerMetadata {
        symbol: symbol.to_string(),
        last_price: last,
        change_pct_24h: change,
        quote_volume_24h: window.iter().map(|c| c.volume * c.close).sum(),
        high_24h: window.iter().map(|c| c.high).reduce(f64::max).unwrap_or(last),
        low_24h: window.iter().map(|c| c.low).reduce(f64::min).unwrap_or(last),
        trades_24h: window.len() as u64,
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketDataProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let candles = self
            .candles
            .get(symbol)
            .ok_or_else(|| MarketDataError::UnknownSymbol(symbol.to_string()))?;
        Ok(candles[candles.len().saturating_sub(limit)..].to_vec())
    }

    async fn get_tickers(&self, symbols: &[String]) -> Result<Vec<TickerMetadata>, MarketDataError> {
        Ok(symbols
            .iter()
            .filter_map(|s| self.tickers.iter().find(|t| &t.symbol == s).cloned())
            .collect())
    }

    async fn health_check(&self) -> bool {
        !self.unhealthy.load(Ordering::Relaxed)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
