//! Binance spot REST integration.

pub mod client;
pub mod messages;
pub mod provider;

pub use client::{BinanceClient, DEFAULT_BASE_URL};
pub use messages::{closed_candles, BinanceKline, BinanceTicker24hr};
pub use provider::BinanceMarketDataProvider;
