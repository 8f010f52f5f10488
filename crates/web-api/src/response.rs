//! Response builder: maps a batch report to an HTTP status code and the
//! structured JSON body.
//!
//! Once a request body is structurally valid, the caller always receives a
//! 2xx-family status (201/207/202) with per-record detail; only
//! request-level parsing and shape failures map to 422.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use pricefeed_ingest::{BatchReport, BatchStatus, ItemOutcome};
use serde::Serialize;

/// Status string when every record was created.
pub const STATUS_SUCCESS: &str = "success";
/// Status string for mixed outcomes.
pub const STATUS_PARTIAL: &str = "partial success, some records created";
/// Status string when no record was created.
pub const STATUS_ERROR: &str = "error, no records created";

/// Processing metadata attached to every batch response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    pub rows: usize,
    pub start_timestamp: DateTime<Utc>,
    pub finish_timestamp: DateTime<Utc>,
}

/// Body of a processed-batch response.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub status: &'static str,
    pub data: Vec<ItemOutcome>,
    pub metadata: ResponseMetadata,
}

/// Body of a request-level (422) error response.
#[derive(Debug, Clone, Serialize)]
pub struct RequestError {
    pub status: &'static str,
    pub error: String,
}

impl RequestError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: "unprocessable",
            error: error.into(),
        }
    }
}

/// Maps a batch classification to its HTTP status code.
#[must_use]
pub fn http_status(status: BatchStatus) -> StatusCode {
    match status {
        BatchStatus::AllSucceeded => StatusCode::CREATED,
        BatchStatus::PartialSuccess => StatusCode::MULTI_STATUS,
        // The request itself was structurally valid JSON, so an all-failed
        // batch is not a 4xx.
        BatchStatus::AllFailed => StatusCode::ACCEPTED,
    }
}

/// Maps a batch classification to its human-readable status string.
#[must_use]
pub fn status_label(status: BatchStatus) -> &'static str {
    match status {
        BatchStatus::AllSucceeded => STATUS_SUCCESS,
        BatchStatus::PartialSuccess => STATUS_PARTIAL,
        BatchStatus::AllFailed => STATUS_ERROR,
    }
}

/// Builds the full HTTP response for a finished batch.
#[must_use]
pub fn batch_response(report: BatchReport) -> (StatusCode, BatchResponse) {
    let code = http_status(report.status);
    let body = BatchResponse {
        status: status_label(report.status),
        data: report.items,
        metadata: ResponseMetadata {
            rows: report.rows,
            start_timestamp: report.start_timestamp,
            finish_timestamp: report.finish_timestamp,
        },
    };
    (code, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn report(status: BatchStatus, items: Vec<ItemOutcome>) -> BatchReport {
        let now = Utc::now();
        BatchReport {
            status,
            rows: items.len(),
            items,
            start_timestamp: now,
            finish_timestamp: now,
        }
    }

    #[test]
    fn all_succeeded_maps_to_201() {
        assert_eq!(http_status(BatchStatus::AllSucceeded), StatusCode::CREATED);
        assert_eq!(status_label(BatchStatus::AllSucceeded), "success");
    }

    #[test]
    fn partial_success_maps_to_207() {
        assert_eq!(
            http_status(BatchStatus::PartialSuccess),
            StatusCode::MULTI_STATUS
        );
        assert_eq!(
            status_label(BatchStatus::PartialSuccess),
            "partial success, some records created"
        );
    }

    #[test]
    fn all_failed_maps_to_202_not_4xx() {
        assert_eq!(http_status(BatchStatus::AllFailed), StatusCode::ACCEPTED);
        assert_eq!(
            status_label(BatchStatus::AllFailed),
            "error, no records created"
        );
    }

    #[test]
    fn batch_response_body_carries_items_and_metadata() {
        let id = Uuid::new_v4();
        let items = vec![ItemOutcome::Success {
            id,
            message_id: "42".to_string(),
        }];
        let (code, body) = batch_response(report(BatchStatus::AllSucceeded, items));

        assert_eq!(code, StatusCode::CREATED);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["status"], json!("success"));
        assert_eq!(value["data"][0]["message_id"], json!("42"));
        assert_eq!(value["metadata"]["rows"], json!(1));
        assert!(value["metadata"]["start_timestamp"].is_string());
        assert!(value["metadata"]["finish_timestamp"].is_string());
    }

    #[test]
    fn request_error_body_shape() {
        let value = serde_json::to_value(RequestError::new("expected a JSON array")).unwrap();
        assert_eq!(value["status"], json!("unprocessable"));
        assert_eq!(value["error"], json!("expected a JSON array"));
    }
}
