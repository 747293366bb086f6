//! Process configuration read from the environment.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::services::binance::DEFAULT_BASE_URL;
use crate::services::market_data::Timeframe;

pub const DEFAULT_SYMBOLS: [&str; 20] = [
    "BTCUSDT", "ETHUSDT", "BNBUSDT", "ADAUSDT", "SOLUSDT", "XRPUSDT", "DOTUSDT", "LINKUSDT",
    "MATICUSDT", "AVAXUSDT", "ATOMUSDT", "FTMUSDT", "NEARUSDT", "SANDUSDT", "MANAUSDT",
    "ALGOUSDT", "VETUSDT", "ICPUSDT", "FILUSDT", "HBARUSDT",
];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Environment name from `APP_ENV`, defaulting to `sandbox`.
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    Static,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScannerConfig {
    pub environment: String,
    pub port: u16,
    pub data_source: DataSource,
    pub fallback_to_static: bool,
    pub binance_base_url: String,
    pub cache_ttl: Duration,
    pub health_check_interval: Duration,
    /// Zero disables the scheduler.
    pub scan_interval_seconds: u64,
    pub timeframe: Timeframe,
    pub candle_limit: usize,
    pub concurrency: usize,
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub symbols: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            port: 8080,
            data_source: DataSource::Live,
            fallback_to_static: true,
            binance_base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl: Duration::from_secs(30),
            health_check_interval: Duration::from_secs(60),
            scan_interval_seconds: 30,
            timeframe: Timeframe::M15,
            candle_limit: 500,
            concurrency: 4,
            batch_size: 20,
            batch_delay: Duration::from_millis(100),
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScannerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(env) = get("APP_ENV") {
            config.environment = env;
        }
        if let Some(port) = get("PORT") {
            config.port = parse("PORT", &port)?;
        }
        if let Some(source) = get("DATA_SOURCE") {
            config.data_source = match source.to_ascii_lowercase().as_str() {
                "live" | "binance" => DataSource::Live,
                "static" | "mock" => DataSource::Static,
                _ => return Err(invalid("DATA_SOURCE", &source, "expected live or static")),
            };
        }
        if let Some(flag) = get("FALLBACK_TO_STATIC") {
            config.fallback_to_static = parse_bool("FALLBACK_TO_STATIC", &flag)?;
        }
        if let Some(url) = get("BINANCE_BASE_URL") {
            url::Url::parse(&url).map_err(|e| invalid("BINANCE_BASE_URL", &url, &e.to_string()))?;
            config.binance_base_url = url;
        }
        if let Some(ttl) = get("CACHE_TTL_SECONDS") {
            config.cache_ttl = Duration::from_secs(parse("CACHE_TTL_SECONDS", &ttl)?);
        }
        if let Some(interval) = get("HEALTH_CHECK_INTERVAL_SECONDS") {
            config.health_check_interval =
                Duration::from_secs(parse("HEALTH_CHECK_INTERVAL_SECONDS", &interval)?);
        }
        if let Some(interval) = get("SCAN_INTERVAL_SECONDS") {
            config.scan_interval_seconds = parse("SCAN_INTERVAL_SECONDS", &interval)?;
        }
        if let Some(tf) = get("SCAN_TIMEFRAME") {
            config.timeframe = tf
                .parse()
                .map_err(|reason: String| invalid("SCAN_TIMEFRAME", &tf, &reason))?;
        }
        if let Some(limit) = get("SCAN_CANDLE_LIMIT") {
            config.candle_limit = parse_positive("SCAN_CANDLE_LIMIT", &limit)?;
        }
        if let Some(concurrency) = get("SCAN_CONCURRENCY") {
            config.concurrency = parse_positive("SCAN_CONCURRENCY", &concurrency)?;
        }
        if let Some(batch) = get("SCAN_BATCH_SIZE") {
            config.batch_size = parse_positive("SCAN_BATCH_SIZE", &batch)?;
        }
        if let Some(delay) = get("SCAN_BATCH_DELAY_MS") {
            config.batch_delay = Duration::from_millis(parse("SCAN_BATCH_DELAY_MS", &delay)?);
        }
        if let Some(symbols) = get("SCAN_SYMBOLS") {
            let parsed: Vec<String> = symbols
                .split(',')
                .map(|s| s.trim().to_ascii_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if parsed.is_empty() {
                return Err(invalid("SCAN_SYMBOLS", &symbols, "no symbols listed"));
            }
            config.symbols = parsed;
        }

        Ok(config)
    }

    /// Restore every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| invalid(key, value, &e.to_string()))
}

fn parse_positive(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    match parse::<usize>(key, value)? {
        0 => Err(invalid(key, value, "must be greater than zero")),
        n => Ok(n),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}
