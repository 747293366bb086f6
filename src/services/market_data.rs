//! Market data provider interface consumed by the scanner.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::error::IndicatorError;
use crate::models::candle::Candle;
use crate::models::scanner::TickerMetadata;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("upstream returned {status} for {endpoint}")]
    Status { status: u16, endpoint: String },
    #[error("failed to decode {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("market data unavailable: {0}")]
    Unavailable(String),
    #[error("invalid candles for {symbol}: {source}")]
    InvalidCandles {
        symbol: String,
        #[source]
        source: IndicatorError,
    },
}

impl MarketDataError {
    /// Transport failures, rate limiting and upstream 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            MarketDataError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            MarketDataError::Status { status, .. } => *status == 429 || *status >= 500,
            MarketDataError::Unavailable(_) => true,
            _ => false,
        }
    }
}

/// Candle interval accepted by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[default]
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 6] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }

    pub fn seconds(&self) -> i64 {
        match self {
            Timeframe::M1 => 60,
            Timeframe::M5 => 300,
            Timeframe::M15 => 900,
            Timeframe::H1 => 3_600,
            Timeframe::H4 => 14_400,
            Timeframe::D1 => 86_400,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s.trim())
            .ok_or_else(|| format!("unsupported timeframe: {}", s))
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Closed candles for `symbol`, oldest first, at most `limit` of them.
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError>;

    /// 24h statistics for each requested symbol the source knows, in request order.
    async fn get_tickers(&self, symbols: &[String]) -> Result<Vec<TickerMetadata>, MarketDataError>;

    async fn get_ticker(&self, symbol: &str) -> Result<TickerMetadata, MarketDataError> {
        let symbols = [symbol.to_string()];
        self.get_tickers(&symbols)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::UnknownSymbol(symbol.to_string()))
    }

    async fn health_check(&self) -> bool;

    fn name(&self) -> &'static str;
}
