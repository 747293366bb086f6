use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::candle::Candle;
use crate::models::setup::{EvaluationResult, SetupBadge};

/// 24h exchange statistics for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerMetadata {
    pub symbol: String,
    pub last_price: f64,
    pub change_pct_24h: f64,
    pub quote_volume_24h: f64,
    #[serde(default)]
    pub high_24h: f64,
    #[serde(default)]
    pub low_24h: f64,
    #[serde(default)]
    pub trades_24h: u64,
}

impl TickerMetadata {
    pub fn new(symbol: impl Into<String>, last_price: f64, change_pct_24h: f64, quote_volume_24h: f64) -> Self {
        Self {
            symbol: symbol.into(),
            last_price,
            change_pct_24h,
            quote_volume_24h,
            high_24h: 0.0,
            low_24h: 0.0,
            trades_24h: 0,
        }
    }

    /// Where the last price sits within the 24h range, 0 at the low and 1 at the high.
    pub fn position_in_range(&self) -> Option<f64> {
        let range = self.high_24h - self.low_24h;
        if range > 0.0 {
            Some(((self.last_price - self.low_24h) / range).clamp(0.0, 1.0))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn from_change(change_pct_24h: f64) -> Self {
        if change_pct_24h > 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

/// Ranked row: ticker fields merged with the evaluation of the pair's candles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerPair {
    pub symbol: String,
    pub last_price: f64,
    pub change_pct_24h: f64,
    pub quote_volume_24h: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub trades_24h: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_in_range: Option<f64>,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    pub setups: Vec<SetupBadge>,
    pub trend: Trend,
    pub scanned_at: DateTime<Utc>,
}

impl ScannerPair {
    pub fn from_evaluation(ticker: &TickerMetadata, evaluation: &EvaluationResult) -> Self {
        Self {
            symbol: ticker.symbol.clone(),
            last_price: ticker.last_price,
            change_pct_24h: ticker.change_pct_24h,
            quote_volume_24h: ticker.quote_volume_24h,
            high_24h: ticker.high_24h,
            low_24h: ticker.low_24h,
            trades_24h: ticker.trades_24h,
            pos_in_range: ticker.position_in_range(),
            score: evaluation.score,
            rsi: evaluation.indicators.rsi,
            setups: evaluation.badges.clone(),
            trend: Trend::from_change(ticker.change_pct_24h),
            scanned_at: Utc::now(),
        }
    }
}

/// Single-pair view: the ranked row plus the full evaluation and its candles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairDetail {
    pub pair: ScannerPair,
    pub timeframe: String,
    pub evaluation: EvaluationResult,
    pub candles: Vec<Candle>,
}
