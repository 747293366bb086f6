//! Thin Binance spot REST client with retries.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::messages::{BinanceErrorBody, BinanceKline, BinanceTicker24hr, INVALID_SYMBOL_CODE};
use crate::services::market_data::{MarketDataError, Timeframe};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com/api/v3";

#[derive(Debug, Clone)]
pub struct BinanceClient {
    http: Client,
    base_url: String,
    retry: ExponentialBuilder,
}

impl BinanceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MarketDataError> {
        // fail early on a malformed root rather than on the first request
        Url::parse(base_url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: ExponentialBuilder::default()
                .with_min_delay(Duration::from_millis(200))
                .with_max_times(3),
        })
    }

    /// Replace the retry policy: `max_times` retries starting at `min_delay`.
    pub fn with_retry(mut self, max_times: usize, min_delay: Duration) -> Self {
        self.retry = ExponentialBuilder::default()
            .with_min_delay(min_delay)
            .with_max_times(max_times);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, MarketDataError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned + Send>(
        &self,
        path: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T, MarketDataError> {
        let url = self.url(path, query)?;
        let http = &self.http;

        (move || fetch_json::<T>(http, path, url.clone()))
            .retry(self.retry)
            .sleep(tokio::time::sleep)
            .when(MarketDataError::is_retryable)
            .notify(|err: &MarketDataError, delay: Duration| {
                warn!(endpoint = path, error = %err, ?delay, "retrying binance request");
            })
            .await
    }

    pub async fn klines(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<BinanceKline>, MarketDataError> {
        let limit = limit.to_string();
        let query = [
            ("symbol", symbol),
            ("interval", timeframe.as_str()),
            ("limit", limit.as_str()),
        ];
        self.get_json("/klines", &query)
            .await
            .map_err(|e| unknown_symbol(e, symbol))
    }

    pub async fn ticker_24hr(&self, symbol: &str) -> Result<BinanceTicker24hr, MarketDataError> {
        self.get_json("/ticker/24hr", &[("symbol", symbol)])
            .await
            .map_err(|e| unknown_symbol(e, symbol))
    }

    pub async fn all_tickers_24hr(&self) -> Result<Vec<BinanceTicker24hr>, MarketDataError> {
        self.get_json("/ticker/24hr", &[]).await
    }

    pub async fn ping(&self) -> Result<(), MarketDataError> {
        let _: serde_json::Value = self.get_json("/ping", &[]).await?;
        Ok(())
    }
}

async fn fetch_json<T: DeserializeOwned + Send>(
    http: &Client,
    endpoint: &'static str,
    url: Url,
) -> Result<T, MarketDataError> {
    debug!(endpoint, "binance request");
    let response = http.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        if let Ok(error) = serde_json::from_str::<BinanceErrorBody>(&body) {
            debug!(endpoint, code = error.code, msg = %error.msg, "binance error body");
            if error.code == INVALID_SYMBOL_CODE {
                return Err(MarketDataError::UnknownSymbol(error.msg));
            }
        }
        return Err(MarketDataError::Status {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
        });
    }

    serde_json::from_str(&body).map_err(|e| MarketDataError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

fn unknown_symbol(err: MarketDataError, symbol: &str) -> MarketDataError {
    match err {
        MarketDataError::UnknownSymbol(_) => MarketDataError::UnknownSymbol(symbol.to_string()),
        other => other,
    }
}
