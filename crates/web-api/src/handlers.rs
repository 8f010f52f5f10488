use crate::response::{self, RequestError};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use pricefeed_ingest::BatchIngestor;
use serde_json::Value;
use std::sync::Arc;

/// Accepts a batch of raw price records, validates and publishes each one,
/// and reports per-record outcomes.
///
/// Request-level failures (unparseable body, wrong top-level shape, empty
/// array) return 422 before any per-record processing; everything else maps
/// to 201/207/202 per the batch classification.
pub async fn create_prices(
    State(ingestor): State<Arc<BatchIngestor>>,
    body: Bytes,
) -> Response {
    let parsed: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "rejected unparseable request body");
            return unprocessable(format!("invalid JSON body: {err}"));
        }
    };

    let Value::Array(batch) = parsed else {
        tracing::warn!("rejected request body with wrong top-level shape");
        return unprocessable("request body must be a JSON array of price records");
    };

    if batch.is_empty() {
        tracing::warn!("rejected empty batch");
        return unprocessable("batch must contain at least one price record");
    }

    let report = ingestor.ingest(batch).await;
    let (code, body) = response::batch_response(report);
    (code, Json(body)).into_response()
}

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}

fn unprocessable(message: impl Into<String>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(RequestError::new(message)),
    )
        .into_response()
}
