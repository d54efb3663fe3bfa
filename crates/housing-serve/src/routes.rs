//! Request handlers and router.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::{info, info_span};

use housing_core::Predictor;
use housing_model::{PredictRequest, PredictResponse};

use crate::error::ApiError;

/// Shared, read-only state for every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
}

impl AppState {
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "drift_enabled": state.predictor.has_profile(),
    }))
}

async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let started = Instant::now();
    let rows = request.records.len();
    let span = info_span!("predict", rows);

    let predictor = Arc::clone(&state.predictor);
    let prediction = tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        predictor.predict_records(&request.records)
    })
    .await
    .map_err(|error| ApiError::Task(error.to_string()))??;

    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
    info!(rows, latency_ms, drift = prediction.drift.is_some(), "served prediction");
    Ok(Json(PredictResponse {
        predictions: prediction.predictions,
        drift: prediction.drift,
        latency_ms,
    }))
}
