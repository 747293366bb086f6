//! Scan Aggregator: evaluates every symbol in the universe and ranks them.

use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ScannerConfig;
use crate::indicators::error::IndicatorError;
use crate::metrics::Metrics;
use crate::models::candle::Candle;
use crate::models::scanner::{PairDetail, ScannerPair, TickerMetadata};
use crate::signals::engine::SetupEngine;
use crate::services::market_data::{MarketDataError, MarketDataProvider, Timeframe};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    MarketData(#[from] MarketDataError),
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// Batching and fetch parameters for one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub symbols: Vec<String>,
    pub timeframe: Timeframe,
    pub candle_limit: usize,
    pub concurrency: usize,
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl From<&ScannerConfig> for ScanOptions {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            symbols: config.symbols.clone(),
            timeframe: config.timeframe,
            candle_limit: config.candle_limit,
            concurrency: config.concurrency,
            batch_size: config.batch_size,
            batch_delay: config.batch_delay,
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from(&ScannerConfig::default())
    }
}

/// Outcome of one scan cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub pairs: Vec<ScannerPair>,
    /// Symbols skipped because their fetch or evaluation failed.
    pub failed: Vec<String>,
    pub timeframe: Timeframe,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ScanReport {
    pub fn empty(timeframe: Timeframe) -> Self {
        Self {
            pairs: Vec::new(),
            failed: Vec::new(),
            timeframe,
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }
}

/// Sort by score descending, keeping input order for equal scores.
pub fn rank_pairs(mut indexed: Vec<(usize, ScannerPair)>) -> Vec<ScannerPair> {
    indexed.sort_by(|(ia, a), (ib, b)| b.score.cmp(&a.score).then(ia.cmp(ib)));
    indexed.into_iter().map(|(_, pair)| pair).collect()
}

/// Synchronous aggregation over already fetched histories. Entries whose
/// fetch failed or whose candles cannot be evaluated are skipped.
pub fn aggregate<E: Display>(
    engine: &SetupEngine,
    inputs: impl IntoIterator<Item = (TickerMetadata, Result<Vec<Candle>, E>)>,
) -> Vec<ScannerPair> {
    let indexed = inputs
        .into_iter()
        .enumerate()
        .filter_map(|(idx, (ticker, candles))| {
            let candles = match candles {
                Ok(candles) => candles,
                Err(e) => {
                    warn!(symbol = %ticker.symbol, error = %e, "skipping symbol: fetch failed");
                    return None;
                }
            };
            match engine.evaluate(&candles) {
                Ok(evaluation) => Some((idx, ScannerPair::from_evaluation(&ticker, &evaluation))),
                Err(e) => {
                    warn!(symbol = %ticker.symbol, error = %e, "skipping symbol: evaluation failed");
                    None
                }
            }
        })
        .collect();
    rank_pairs(indexed)
}

pub struct Scanner {
    provider: Arc<dyn MarketDataProvider>,
    engine: SetupEngine,
    options: ScanOptions,
    metrics: Option<Arc<Metrics>>,
}

impl Scanner {
    pub fn new(provider: Arc<dyn MarketDataProvider>, engine: SetupEngine, options: ScanOptions) -> Self {
        Self {
            provider,
            engine,
            options,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn engine(&self) -> &SetupEngine {
        &self.engine
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn provider(&self) -> &Arc<dyn MarketDataProvider> {
        &self.provider
    }

    /// Full scan of the configured universe.
    ///
    /// Fails only when the ticker list itself cannot be fetched; individual
    /// symbol failures are logged and reported in `ScanReport::failed`.
    pub async fn scan(&self) -> Result<ScanReport, ScanError> {
        let tickers = self.provider.get_tickers(&self.options.symbols).await?;
        Ok(self.scan_tickers(tickers).await)
    }

    pub async fn scan_tickers(&self, tickers: Vec<TickerMetadata>) -> ScanReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        let batch_size = self.options.batch_size.max(1);
        let concurrency = self.options.concurrency.max(1);
        let batch_count = tickers.len().div_ceil(batch_size);

        let mut indexed = Vec::with_capacity(tickers.len());
        let mut failed = Vec::new();

        for (batch_idx, batch) in tickers.chunks(batch_size).enumerate() {
            let offset = batch_idx * batch_size;
            // owned tickers keep the per-symbol futures Send
            let results: Vec<_> = stream::iter(batch.iter().cloned().enumerate())
                .map(|(i, ticker)| async move {
                    let result = self.evaluate_ticker(&ticker).await;
                    (offset + i, ticker, result)
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

            for (idx, ticker, result) in results {
                match result {
                    Ok(pair) => indexed.push((idx, pair)),
                    Err(e) => {
                        let stage = match e {
                            ScanError::MarketData(_) => "fetch",
                            ScanError::Indicator(_) => "evaluate",
                        };
                        warn!(symbol = %ticker.symbol, stage, error = %e, "skipping symbol");
                        if let Some(metrics) = &self.metrics {
                            metrics.record_symbol_failure(stage);
                        }
                        failed.push((idx, ticker.symbol));
                    }
                }
            }

            if batch_idx + 1 < batch_count && !self.options.batch_delay.is_zero() {
                tokio::time::sleep(self.options.batch_delay).await;
            }
        }

        failed.sort_by_key(|(idx, _)| *idx);
        let pairs = rank_pairs(indexed);
        let elapsed = clock.elapsed();

        if let Some(metrics) = &self.metrics {
            metrics.scans_total.inc();
            metrics.scan_duration_seconds.observe(elapsed.as_secs_f64());
            metrics.ranked_pairs.set(pairs.len() as i64);
        }
        info!(
            ranked = pairs.len(),
            failed = failed.len(),
            duration_ms = elapsed.as_millis() as u64,
            top = pairs.first().map(|p| p.symbol.as_str()).unwrap_or("-"),
            "scan complete"
        );

        ScanReport {
            pairs,
            failed: failed.into_iter().map(|(_, symbol)| symbol).collect(),
            timeframe: self.options.timeframe,
            started_at,
            duration_ms: elapsed.as_millis() as u64,
        }
    }

    async fn evaluate_ticker(&self, ticker: &TickerMetadata) -> Result<ScannerPair, ScanError> {
        let candles = self
            .provider
            .get_candles(&ticker.symbol, self.options.timeframe, self.options.candle_limit)
            .await?;
        let evaluation = self.engine.evaluate(&candles)?;
        debug!(symbol = %ticker.symbol, score = evaluation.score, badges = evaluation.badges.len(), "evaluated");
        Ok(ScannerPair::from_evaluation(ticker, &evaluation))
    }

    /// Ticker, evaluation and candles for one symbol on `timeframe`.
    pub async fn pair_detail(&self, symbol: &str, timeframe: Timeframe) -> Result<PairDetail, ScanError> {
        let (ticker, candles) = tokio::try_join!(
            self.provider.get_ticker(symbol),
            self.provider
                .get_candles(symbol, timeframe, self.options.candle_limit),
        )?;
        let evaluation = self.engine.evaluate(&candles)?;
        Ok(PairDetail {
            pair: ScannerPair::from_evaluation(&ticker, &evaluation),
            timeframe: timeframe.to_string(),
            evaluation,
            candles,
        })
    }
}
