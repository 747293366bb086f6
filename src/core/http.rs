//! HTTP endpoint server using Axum

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::indicators::error::IndicatorError;
use crate::indicators::parser::parse_rule_selection;
use crate::metrics::Metrics;
use crate::models::candle::Candle;
use crate::models::indicators::{IndicatorBundle, IndicatorParams};
use crate::models::rules::RuleSet;
use crate::models::scanner::{PairDetail, ScannerPair};
use crate::models::setup::EvaluationResult;
use crate::scanner::aggregator::{ScanError, ScanReport, Scanner};
use crate::scanner::filter::ScannerFilter;
use crate::services::market_data::{MarketDataError, Timeframe};
use crate::signals::engine::SetupEngine;

#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<Scanner>,
    /// Latest ranked scan, replaced wholesale by each refresh.
    pub snapshot: Arc<RwLock<Option<ScanReport>>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub environment: String,
}

impl AppState {
    pub fn new(scanner: Arc<Scanner>, metrics: Arc<Metrics>, environment: impl Into<String>) -> Self {
        Self {
            scanner,
            snapshot: Arc::new(RwLock::new(None)),
            metrics,
            start_time: Arc::new(Instant::now()),
            environment: environment.into(),
        }
    }

    /// Run a scan and store it as the current snapshot.
    pub async fn refresh(&self) -> Result<ScanReport, ScanError> {
        let report = self.scanner.scan().await?;
        *self.snapshot.write().await = Some(report.clone());
        Ok(report)
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<IndicatorError> for ApiError {
    fn from(e: IndicatorError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<ScanError> for ApiError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::MarketData(MarketDataError::UnknownSymbol(symbol)) => {
                ApiError::NotFound(format!("unknown symbol: {}", symbol))
            }
            other => {
                error!(error = %other, "upstream market data failure");
                ApiError::Upstream(other.to_string())
            }
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let provider = state.scanner.provider();
    let upstream_healthy = provider.health_check().await;
    let snapshot = state.snapshot.read().await;
    Json(json!({
        "status": if upstream_healthy { "healthy" } else { "degraded" },
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "service": "cryptoscan",
        "environment": state.environment,
        "data_source": provider.name(),
        "last_scan": snapshot.as_ref().map(|r| r.started_at),
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScannerResponse {
    pub pairs: Vec<ScannerPair>,
    pub total: usize,
    pub failed: Vec<String>,
    pub timeframe: Timeframe,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ScannerResponse {
    fn from_report(report: &ScanReport, filter: &ScannerFilter) -> Self {
        Self {
            pairs: filter.apply(&report.pairs),
            total: report.pairs.len(),
            failed: report.failed.clone(),
            timeframe: report.timeframe,
            updated_at: report.started_at,
        }
    }
}

/// Latest ranked snapshot, scanning on first use.
async fn get_scanner(
    State(state): State<AppState>,
    Query(filter): Query<ScannerFilter>,
) -> Result<Json<ScannerResponse>, ApiError> {
    if let Some(report) = state.snapshot.read().await.as_ref() {
        return Ok(Json(ScannerResponse::from_report(report, &filter)));
    }
    let report = state.refresh().await?;
    Ok(Json(ScannerResponse::from_report(&report, &filter)))
}

async fn refresh_scanner(
    State(state): State<AppState>,
    Query(filter): Query<ScannerFilter>,
) -> Result<Json<ScannerResponse>, ApiError> {
    let report = state.refresh().await?;
    Ok(Json(ScannerResponse::from_report(&report, &filter)))
}

#[derive(Debug, Deserialize)]
struct PairQuery {
    timeframe: Option<String>,
}

async fn get_pair(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<PairQuery>,
) -> Result<Json<PairDetail>, ApiError> {
    let timeframe = match query.timeframe.as_deref() {
        Some(raw) => raw.parse::<Timeframe>().map_err(ApiError::BadRequest)?,
        None => state.scanner.options().timeframe,
    };
    let detail = state
        .scanner
        .pair_detail(&symbol.to_ascii_uppercase(), timeframe)
        .await?;
    Ok(Json(detail))
}

/// Body of `POST /api/evaluate`. Rules come either typed (`rules`) or as the
/// loose per-rule maps (`enabled_rules` + `rule_params`); typed wins.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EvaluateRequest {
    pub candles: Vec<Candle>,
    pub params: Option<IndicatorParams>,
    pub rules: Option<RuleSet>,
    pub enabled_rules: Option<Vec<String>>,
    pub rule_params: HashMap<String, HashMap<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub result: EvaluationResult,
    pub indicators: IndicatorBundle,
}

fn stringify_params(
    maps: &HashMap<String, HashMap<String, Value>>,
) -> HashMap<String, HashMap<String, String>> {
    maps.iter()
        .map(|(rule, params)| {
            let params = params
                .iter()
                .map(|(k, v)| {
                    let raw = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), raw)
                })
                .collect();
            (rule.clone(), params)
        })
        .collect()
}

async fn evaluate(Json(request): Json<EvaluateRequest>) -> Result<Json<EvaluateResponse>, ApiError> {
    let base = request.params.unwrap_or_default();
    let (params, rules) = match (request.rules, request.enabled_rules) {
        (Some(rules), _) => (base, rules),
        (None, Some(enabled)) => {
            parse_rule_selection(&enabled, &stringify_params(&request.rule_params), &base)?
        }
        (None, None) => (base, RuleSet::default()),
    };

    let engine = SetupEngine::new(params, rules)?;
    let (result, indicators) = engine.evaluate_with_indicators(&request.candles)?;
    Ok(Json(EvaluateResponse { result, indicators }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/scanner", get(get_scanner))
        .route("/api/scanner/refresh", post(refresh_scanner))
        .route("/api/pairs/{symbol}", get(get_pair))
        .route("/api/evaluate", post(evaluate))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!("Metrics endpoint available at http://0.0.0.0:{}/metrics", port);
    axum::serve(listener, app).await?;

    Ok(())
}
