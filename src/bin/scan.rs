//! One-shot scan: ranks the configured universe once and prints a table.
//!
//! Usage: `scan [timeframe]`, e.g. `scan 1h`. Everything else comes from the
//! same environment variables as the API server.

use cryptoscan::config::ScannerConfig;
use cryptoscan::logging;
use cryptoscan::models::ScannerPair;
use cryptoscan::scanner::{ScanOptions, Scanner};
use cryptoscan::services::{build_provider, Timeframe};
use cryptoscan::signals::SetupEngine;
use dotenvy::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();

    let mut config = ScannerConfig::from_env()?;
    logging::init_logging_for(&config.environment);

    if let Some(raw) = std::env::args().nth(1) {
        config.timeframe = raw.parse::<Timeframe>()?;
    }

    let provider = build_provider(&config)?;
    let scanner = Scanner::new(provider, SetupEngine::default(), ScanOptions::from(&config));
    info!(timeframe = %config.timeframe, symbols = config.symbols.len(), "running scan");

    let report = scanner.scan().await?;

    println!(
        "{:<12} {:>14} {:>8} {:>16} {:>6} {:>6}  setups",
        "symbol", "price", "24h %", "quote vol", "rsi", "score"
    );
    for pair in &report.pairs {
        println!("{}", format_row(pair));
    }
    if !report.failed.is_empty() {
        println!();
        println!("failed: {}", report.failed.join(", "));
    }
    println!();
    println!(
        "{} ranked on {} in {} ms",
        report.pairs.len(),
        report.timeframe,
        report.duration_ms
    );

    Ok(())
}

fn format_row(pair: &ScannerPair) -> String {
    let rsi = pair
        .rsi
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "-".to_string());
    let setups: Vec<&str> = pair.setups.iter().map(|b| b.label()).collect();
    format!(
        "{:<12} {:>14.4} {:>8.2} {:>16.0} {:>6} {:>6}  {}",
        pair.symbol,
        pair.last_price,
        pair.change_pct_24h,
        pair.quote_volume_24h,
        rsi,
        pair.score,
        setups.join(", ")
    )
}

