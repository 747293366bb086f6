//! Upstream market data sources.

pub mod binance;
pub mod cache;
pub mod fallback;
pub mod market_data;
pub mod static_provider;

pub use binance::{BinanceClient, BinanceMarketDataProvider};
pub use cache::TtlCache;
pub use fallback::FallbackMarketDataProvider;
pub use market_data::{MarketDataError, MarketDataProvider, Timeframe};
pub use static_provider::StaticMarketDataProvider;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{DataSource, ScannerConfig};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Provider stack for `config`: Binance (optionally backed by demo data) or
/// demo data alone.
pub fn build_provider(config: &ScannerConfig) -> Result<Arc<dyn MarketDataProvider>, MarketDataError> {
    let demo = || {
        Arc::new(StaticMarketDataProvider::demo(
            &config.symbols,
            config.timeframe,
            config.candle_limit,
        ))
    };

    let provider: Arc<dyn MarketDataProvider> = match config.data_source {
        DataSource::Static => demo(),
        DataSource::Live => {
            let client = BinanceClient::new(&config.binance_base_url, REQUEST_TIMEOUT)?;
            let live = Arc::new(BinanceMarketDataProvider::new(client, config.cache_ttl));
            if config.fallback_to_static {
                Arc::new(FallbackMarketDataProvider::new(
                    live,
                    demo(),
                    config.health_check_interval,
                ))
            } else {
                live
            }
        }
    };

    info!(
        provider = provider.name(),
        symbols = config.symbols.len(),
        "market data provider ready"
    );
    Ok(provider)
}
