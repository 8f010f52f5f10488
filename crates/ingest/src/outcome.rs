//! Per-record outcomes and batch classification.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Terminal outcome for one record in a batch.
///
/// Serializes to the response item shape: `{id, message_id}` on success,
/// `{id?, error, input_data}` on failure, where `input_data` echoes the
/// originally submitted record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemOutcome {
    Success {
        id: Uuid,
        message_id: String,
    },
    Failure {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Uuid>,
        error: String,
        input_data: Value,
    },
}

impl ItemOutcome {
    /// Returns true for a `Success` outcome.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Overall classification of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchStatus {
    /// Every record validated and published.
    AllSucceeded,
    /// At least one success and at least one failure.
    PartialSuccess,
    /// Every record failed validation or publish.
    AllFailed,
}

impl BatchStatus {
    /// Classifies a sequence of outcomes.
    ///
    /// An empty sequence classifies as `AllSucceeded` (vacuously); the HTTP
    /// layer rejects empty batches before they reach classification.
    #[must_use]
    pub fn classify(items: &[ItemOutcome]) -> Self {
        let succeeded = items.iter().filter(|i| i.is_success()).count();
        if succeeded == items.len() {
            Self::AllSucceeded
        } else if succeeded == 0 {
            Self::AllFailed
        } else {
            Self::PartialSuccess
        }
    }
}

/// Aggregated result of one batch request. Created fresh per request and
/// discarded once the response is sent.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub status: BatchStatus,
    pub items: Vec<ItemOutcome>,
    pub rows: usize,
    pub start_timestamp: DateTime<Utc>,
    pub finish_timestamp: DateTime<Utc>,
}
