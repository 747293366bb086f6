//! Integration tests for the API Server
//!
//! Tests HTTP endpoints, health checks, metrics, and scanner endpoints.

#[path = "api_server/test_utils.rs"]
mod test_utils;

use serde_json::{json, Value};

use test_utils::{breakout_candles, TestApiServer};

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "cryptoscan");
    assert_eq!(body["data_source"], "static");
    assert!(body["last_scan"].is_null());
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApiServer::new().await;
    let _ = app.server.get("/health").await;

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    assert!(
        body.contains("http_requests_total"),
        "Expected http_requests_total metric"
    );
    assert!(
        body.contains("http_request_duration_seconds"),
        "Expected http_request_duration_seconds metric"
    );
}

#[tokio::test]
async fn scanner_endpoint_ranks_pairs() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/api/scanner").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["total"], 2);
    assert_eq!(body["timeframe"], "15m");
    assert_eq!(body["failed"], json!(["BBBUSDT"]));

    let pairs = body["pairs"].as_array().unwrap();
    assert_eq!(pairs[0]["symbol"], "CCCUSDT");
    assert_eq!(pairs[1]["symbol"], "AAAUSDT");
    assert!(pairs[0]["score"].as_u64().unwrap() >= 4);
    let setups = pairs[0]["setups"].as_array().unwrap();
    assert!(setups.contains(&json!("Breakout + Vol")));
    assert!(setups.contains(&json!("Volumen spike")));
    assert_eq!(pairs[0]["trend"], "up");
}

#[tokio::test]
async fn scanner_endpoint_applies_filters() {
    let app = TestApiServer::new().await;

    let response = app.server.get("/api/scanner?trend=down").await;
    let body: Value = response.json();
    let pairs = body["pairs"].as_array().unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0]["symbol"], "AAAUSDT");
    // total counts the unfiltered snapshot
    assert_eq!(body["total"], 2);

    let response = app.server.get("/api/scanner?sort_by=volume&limit=1").await;
    let body: Value = response.json();
    let pairs = body["pairs"].as_array().unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0]["symbol"], "AAAUSDT");

    let response = app.server.get("/api/scanner?setups=Breakout").await;
    let body: Value = response.json();
    assert_eq!(body["pairs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn scanner_snapshot_is_cached_until_refresh() {
    let app = TestApiServer::new().await;
    let _ = app.server.get("/api/scanner").await;
    let _ = app.server.get("/api/scanner").await;
    assert_eq!(app.metrics.scans_total.get(), 1);

    let response = app.server.post("/api/scanner/refresh").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(app.metrics.scans_total.get(), 2);

    let health: Value = app.server.get("/health").await.json();
    assert!(!health["last_scan"].is_null());
}

#[tokio::test]
async fn pair_endpoint_returns_detail() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/api/pairs/cccusdt?timeframe=1h").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["pair"]["symbol"], "CCCUSDT");
    assert_eq!(body["timeframe"], "1h");
    assert_eq!(body["candles"].as_array().unwrap().len(), 26);
    assert_eq!(body["evaluation"]["score"], body["pair"]["score"]);
}

#[tokio::test]
async fn pair_endpoint_errors() {
    let app = TestApiServer::new().await;

    let response = app.server.get("/api/pairs/ZZZUSDT").await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("ZZZUSDT"));

    let response = app.server.get("/api/pairs/CCCUSDT?timeframe=2h").await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn evaluate_endpoint_runs_selected_rules() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .post("/api/evaluate")
        .json(&json!({
            "candles": breakout_candles(),
            "enabled_rules": ["breakout_volume", "volume_spike"],
            "rule_params": { "volume_spike": { "multiplier": 3 } }
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["result"]["badges"], json!(["Breakout + Vol", "Volumen spike"]));
    assert_eq!(body["result"]["score"], 4);
    assert_eq!(body["indicators"]["candle_count"], 26);
}

#[tokio::test]
async fn evaluate_endpoint_accepts_typed_rules() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .post("/api/evaluate")
        .json(&json!({
            "candles": breakout_candles(),
            "rules": [{ "rule": "volume_spike", "weight": 6 }]
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["result"]["score"], 6);
}

#[tokio::test]
async fn evaluate_endpoint_with_no_candles() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .post("/api/evaluate")
        .json(&json!({ "candles": [] }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["result"]["score"], 0);
    assert_eq!(body["result"]["badges"], json!([]));
}

#[tokio::test]
async fn evaluate_endpoint_rejects_bad_input() {
    let app = TestApiServer::new().await;

    let mut candles = breakout_candles();
    candles.swap(3, 4);
    let response = app
        .server
        .post("/api/evaluate")
        .json(&json!({ "candles": candles }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .server
        .post("/api/evaluate")
        .json(&json!({ "candles": [], "enabled_rules": ["macd_cross"] }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("macd_cross"));

    let response = app
        .server
        .post("/api/evaluate")
        .json(&json!({
            "candles": breakout_candles(),
            "rules": [{ "rule": "breakout_volume", "lookback": u64::MAX }]
        }))
        .await;
    assert_eq!(response.status_code(), 400);
}
