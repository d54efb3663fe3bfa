//! Mapping prediction failures onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use housing_core::PredictError;

/// Handler failure.
///
/// Client faults become 422 with `{error, kind, details}`. Server faults are
/// logged in full and answered with an opaque 500.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Predict(#[from] PredictError),
    #[error("prediction task failed: {0}")]
    Task(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Predict(error) if error.is_client_error() => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Predict(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = ?self, "prediction failed");
            return (
                status,
                Json(json!({ "error": "internal server error" })),
            )
                .into_response();
        }

        let body = match &self {
            Self::Predict(PredictError::Schema(schema)) => json!({
                "error": schema.to_string(),
                "kind": schema.kind().as_str(),
                "details": schema.details(),
            }),
            other => json!({
                "error": other.to_string(),
                "kind": "invalid_record",
                "details": {},
            }),
        };
        (status, Json(body)).into_response()
    }
}
