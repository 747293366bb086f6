//! Integration tests for the Binance REST client and provider against a
//! mocked exchange.

use std::time::Duration;

use cryptoscan::services::{
    BinanceClient, BinanceMarketDataProvider, MarketDataError, MarketDataProvider, Timeframe,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn kline(open_ms: i64, close: &str, volume: &str) -> Value {
    json!([
        open_ms,
        "100.0",
        "101.0",
        "99.0",
        close,
        volume,
        open_ms + 899_999,
        "1000.0",
        42,
        "5.0",
        "500.0",
        "0"
    ])
}

fn ticker(symbol: &str, last: &str, change: &str) -> Value {
    json!({
        "symbol": symbol,
        "priceChangePercent": change,
        "lastPrice": last,
        "highPrice": "110.0",
        "lowPrice": "90.0",
        "quoteVolume": "123456.5",
        "count": 77
    })
}

fn client(server: &MockServer) -> BinanceClient {
    BinanceClient::new(&server.uri(), Duration::from_secs(5))
        .expect("valid base url")
        .with_retry(2, Duration::from_millis(10))
}

fn provider(server: &MockServer) -> BinanceMarketDataProvider {
    BinanceMarketDataProvider::new(client(server), Duration::from_secs(60))
}

#[tokio::test]
async fn klines_become_closed_candles_and_are_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "15m"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline(1_700_000_000_000, "100.5", "10.0"),
            kline(1_700_000_900_000, "100.7", "11.0"),
            kline(1_700_001_800_000, "100.9", "12.0"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let candles = provider
        .get_candles("BTCUSDT", Timeframe::M15, 3)
        .await
        .unwrap();

    // the still-forming last kline is dropped
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].time, 1_700_000_899);
    assert_eq!(candles[1].time, 1_700_001_799);
    assert_eq!(candles[1].close, 100.7);
    assert_eq!(candles[1].volume, 11.0);

    let cached = provider
        .get_candles("BTCUSDT", Timeframe::M15, 3)
        .await
        .unwrap();
    assert_eq!(cached, candles);
}

#[tokio::test]
async fn tickers_follow_request_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ticker/24hr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            ticker("BTCUSDT", "50000.0", "2.5"),
            ticker("ETHUSDT", "3000.0", "-1.25"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let request = vec![
        "ETHUSDT".to_string(),
        "DOGEUSDT".to_string(),
        "BTCUSDT".to_string(),
    ];
    let tickers = provider.get_tickers(&request).await.unwrap();

    let symbols: Vec<&str> = tickers.iter().map(|t| t.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["ETHUSDT", "BTCUSDT"]);
    assert_eq!(tickers[0].change_pct_24h, -1.25);
    assert_eq!(tickers[0].quote_volume_24h, 123456.5);
    assert_eq!(tickers[0].trades_24h, 77);

    // served from the ticker cache
    let eth = provider.get_ticker("ETHUSDT").await.unwrap();
    assert_eq!(eth.last_price, 3000.0);
}

#[tokio::test]
async fn invalid_symbol_maps_to_unknown_symbol() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/klines"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"code": -1121, "msg": "Invalid symbol."})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = provider(&server)
        .get_candles("FOOUSDT", Timeframe::H1, 10)
        .await;
    match result {
        Err(MarketDataError::UnknownSymbol(symbol)) => assert_eq!(symbol, "FOOUSDT"),
        other => panic!("expected unknown symbol, got {:?}", other),
    }
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/klines"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/klines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline(1_700_000_000_000, "100.5", "10.0"),
            kline(1_700_000_900_000, "100.7", "11.0"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let klines = client(&server)
        .klines("BTCUSDT", Timeframe::M15, 2)
        .await
        .unwrap();
    assert_eq!(klines.len(), 2);
}

#[tokio::test]
async fn retries_give_up_after_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ticker/24hr"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let result = client(&server).all_tickers_24hr().await;
    assert!(matches!(
        result,
        Err(MarketDataError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/klines"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"code": -1100, "msg": "Illegal characters"})))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server).klines("BTCUSDT", Timeframe::M15, 2).await;
    assert!(matches!(
        result,
        Err(MarketDataError::Status { status: 400, .. })
    ));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/klines"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client(&server).klines("BTCUSDT", Timeframe::M15, 2).await;
    assert!(matches!(result, Err(MarketDataError::Decode { .. })));
}

#[tokio::test]
async fn health_check_pings_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(provider(&server).health_check().await);
    assert_eq!(provider(&server).name(), "binance");

    let silent = MockServer::start().await;
    assert!(!provider(&silent).health_check().await);
}
