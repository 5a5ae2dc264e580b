//! HTTP front end for the prediction service

use crate::config::AppConfig;
use crate::error::PredictError;
use crate::metrics::{MetricsSnapshot, ServiceMetrics};
use crate::models::inference::InferenceEngine;
use crate::models::loader::ArtifactBundle;
use crate::types::input::RawInput;
use crate::types::prediction::{ErrorResponse, PredictionResponse};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub bundle: Arc<ArtifactBundle>,
    pub engine: InferenceEngine,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new(bundle: ArtifactBundle, engine: InferenceEngine) -> Self {
        Self {
            bundle: Arc::new(bundle),
            engine,
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = match self {
            PredictError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            PredictError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    ready: bool,
    features: usize,
}

/// Build the router with CORS for the configured frontend origin
pub fn router(state: AppState, config: &AppConfig) -> Result<Router> {
    let origin: HeaderValue = config
        .server
        .cors_origin
        .parse()
        .with_context(|| format!("Invalid CORS origin {:?}", config.server.cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(routes(state).layer(cors).layer(TraceLayer::new_for_http()))
}

/// Routes without middleware
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stats", get(stats))
        .route("/api/predict", post(predict))
        .route("/predict", post(predict))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ready: state.bundle.is_ready(),
        features: state.bundle.feature_count(),
    })
}

async fn stats(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PredictionResponse>, PredictError> {
    let request_id = uuid::Uuid::new_v4();
    let start_time = Instant::now();
    state.metrics.record_request();

    let outcome = parse_body(&headers, &body)
        .and_then(|raw| state.engine.predict(&state.bundle, &raw));

    match outcome {
        Ok(result) => {
            let latency = start_time.elapsed();
            state
                .metrics
                .record_prediction(latency, result.prediction, result.probability);
            debug!(
                request_id = %request_id,
                prediction = result.prediction,
                probability = result.probability,
                latency_us = latency.as_micros() as u64,
                "Prediction served"
            );
            Ok(Json(result.to_response()))
        }
        Err(e) => {
            state.metrics.record_failure(&e);
            match &e {
                PredictError::ModelUnavailable => {
                    error!(request_id = %request_id, "Prediction requested but model is not loaded")
                }
                PredictError::InvalidInput(msg) => {
                    warn!(request_id = %request_id, reason = %msg, "Rejected prediction input")
                }
            }
            Err(e)
        }
    }
}

/// Decode a form or JSON body. Anything that is not a form is parsed as JSON.
fn parse_body(headers: &HeaderMap, body: &[u8]) -> Result<RawInput, PredictError> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false);

    if is_form {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| PredictError::invalid(format!("malformed form body: {e}")))?;
        return Ok(RawInput::from_pairs(pairs));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PredictError::invalid("empty request body"));
    }
    serde_json::from_slice(body).map_err(|e| PredictError::invalid(format!("malformed JSON body: {e}")))
}

/// Bind and serve until ctrl-c
pub async fn serve(state: AppState, config: &AppConfig) -> Result<()> {
    let app = router(state, config)?;
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "Listening for prediction requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
