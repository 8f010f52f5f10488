//! Batch orchestration: validate then publish, per record, with
//! partial-failure isolation.
//!
//! Records are dispatched as index-tagged tasks so large batches overlap
//! their publish I/O, and the outcomes are reassembled into input order
//! before the report is built. One record failing validation or publish
//! never aborts, blocks, or cancels the rest of the batch.

use crate::outcome::{BatchReport, BatchStatus, ItemOutcome};
use chrono::Utc;
use pricefeed_core::validate_record;
use pricefeed_pubsub::Publisher;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;

/// Orchestrates one batch of raw records through validation and publish.
pub struct BatchIngestor {
    publisher: Arc<dyn Publisher>,
}

impl BatchIngestor {
    #[must_use]
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self { publisher }
    }

    /// Processes a batch of raw records and aggregates per-record outcomes.
    ///
    /// Outcomes are returned in input order regardless of publish
    /// completion order. Record-level errors are captured in the report,
    /// never propagated.
    pub async fn ingest(&self, batch: Vec<Value>) -> BatchReport {
        let start_timestamp = Utc::now();
        let rows = batch.len();

        let mut tasks = JoinSet::new();
        for (index, raw) in batch.iter().cloned().enumerate() {
            let publisher = Arc::clone(&self.publisher);
            tasks.spawn(async move { (index, process_record(publisher.as_ref(), raw).await) });
        }

        let mut slots: Vec<Option<ItemOutcome>> = std::iter::repeat_with(|| None)
            .take(rows)
            .collect();
        while let Some(joined) = tasks.join_next().await {
            if let Ok((index, outcome)) = joined {
                slots[index] = Some(outcome);
            }
            // A JoinError slot stays None and is backfilled below from the
            // retained original input.
        }

        let items: Vec<ItemOutcome> = slots
            .into_iter()
            .zip(batch)
            .map(|(slot, raw)| {
                slot.unwrap_or_else(|| {
                    tracing::error!("record task aborted before producing an outcome");
                    ItemOutcome::Failure {
                        id: derivable_id(&raw),
                        error: "internal error: record task aborted".to_string(),
                        input_data: raw,
                    }
                })
            })
            .collect();

        let status = BatchStatus::classify(&items);
        let succeeded = items.iter().filter(|i| i.is_success()).count();
        tracing::info!(
            target: "audit",
            rows,
            succeeded,
            failed = rows - succeeded,
            status = ?status,
            "batch ingest finished"
        );

        BatchReport {
            status,
            items,
            rows,
            start_timestamp,
            finish_timestamp: Utc::now(),
        }
    }
}

async fn process_record(publisher: &dyn Publisher, raw: Value) -> ItemOutcome {
    let record = match validate_record(&raw, Utc::now()) {
        Ok(record) => record,
        Err(err) => {
            tracing::warn!(error = %err, "record failed validation");
            return ItemOutcome::Failure {
                id: derivable_id(&raw),
                error: err.to_string(),
                input_data: raw,
            };
        }
    };

    match publisher.publish(&record).await {
        Ok(message_id) => {
            tracing::debug!(record_id = %record.id, message_id = %message_id, "record published");
            ItemOutcome::Success {
                id: record.id,
                message_id,
            }
        }
        Err(err) => {
            tracing::error!(record_id = %record.id, error = %err, "record failed to publish");
            ItemOutcome::Failure {
                id: Some(record.id),
                error: err.to_string(),
                input_data: raw,
            }
        }
    }
}

/// Extracts the caller-supplied id from a raw record when it is well-formed,
/// so failure outcomes can still be correlated.
fn derivable_id(raw: &Value) -> Option<Uuid> {
    raw.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}
