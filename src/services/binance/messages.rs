//! Binance REST payloads and their mapping onto scanner models.

use serde::{Deserialize, Serialize};

use crate::models::candle::Candle;
use crate::models::scanner::TickerMetadata;
use crate::services::market_data::MarketDataError;

/// Raw `/klines` row: open time, OHLCV as strings, close time, then fields we ignore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinanceKline(
    pub i64,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub i64,
    pub String,
    pub u64,
    pub String,
    pub String,
    pub String,
);

impl BinanceKline {
    pub fn open_time(&self) -> i64 {
        self.0
    }

    pub fn close_time(&self) -> i64 {
        self.6
    }

    /// Candle stamped with the kline close time in whole seconds.
    pub fn to_candle(&self) -> Result<Candle, MarketDataError> {
        Ok(Candle::new(
            self.close_time().div_euclid(1000),
            parse_decimal("/klines", "open", &self.1)?,
            parse_decimal("/klines", "high", &self.2)?,
            parse_decimal("/klines", "low", &self.3)?,
            parse_decimal("/klines", "close", &self.4)?,
            parse_decimal("/klines", "volume", &self.5)?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTicker24hr {
    pub symbol: String,
    pub price_change_percent: String,
    pub last_price: String,
    pub high_price: String,
    pub low_price: String,
    pub quote_volume: String,
    #[serde(default)]
    pub count: u64,
}

impl BinanceTicker24hr {
    pub fn to_metadata(&self) -> Result<TickerMetadata, MarketDataError> {
        const ENDPOINT: &str = "/ticker/24hr";
        Ok(TickerMetadata {
            symbol: self.symbol.clone(),
            last_price: parse_decimal(ENDPOINT, "lastPrice", &self.last_price)?,
            change_pct_24h: parse_decimal(ENDPOINT, "priceChangePercent", &self.price_change_percent)?,
            quote_volume_24h: parse_decimal(ENDPOINT, "quoteVolume", &self.quote_volume)?,
            high_24h: parse_decimal(ENDPOINT, "highPrice", &self.high_price)?,
            low_24h: parse_decimal(ENDPOINT, "lowPrice", &self.low_price)?,
            trades_24h: self.count,
        })
    }
}

/// Error body returned with 4xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceErrorBody {
    pub code: i64,
    pub msg: String,
}

/// Binance code for an unknown trading pair.
pub const INVALID_SYMBOL_CODE: i64 = -1121;

fn parse_decimal(endpoint: &str, field: &str, raw: &str) -> Result<f64, MarketDataError> {
    raw.parse::<f64>().map_err(|_| MarketDataError::Decode {
        endpoint: endpoint.to_string(),
        message: format!("{} is not a number: {:?}", field, raw),
    })
}

/// Candles for every kline except the last one, which is still forming.
pub fn closed_candles(klines: &[BinanceKline]) -> Result<Vec<Candle>, MarketDataError> {
    let closed = klines.len().saturating_sub(1);
    klines[..closed].iter().map(BinanceKline::to_candle).collect()
}
