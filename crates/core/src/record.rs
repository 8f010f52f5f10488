//! Normalized price record schema.
//!
//! A `PriceRecord` is the only shape that crosses the publish boundary.
//! Field names and defaults match the downstream queue schema exactly:
//! `metadata` is always a string (never null) and `is_deleted` is a native
//! boolean.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One validated cryptocurrency price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Server-assigned UUID v4, generated at validation time when the
    /// caller does not supply one.
    pub id: Uuid,
    /// Human-readable name of the crypto currency (e.g. "Bitcoin").
    pub crypto_name: String,
    /// Symbol of the crypto currency (e.g. "BTC").
    pub crypto_symbol: String,
    /// Fiat currency the prices are denominated in (e.g. "USD").
    pub fiat_currency: String,
    /// Source the data was pulled from (e.g. "Binance").
    pub source: String,
    /// Ticker used to look up the currency (e.g. "BTCUSDT").
    pub ticker: String,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
    /// Observation timestamp (timezone-aware, normalized to UTC).
    pub timestamp: DateTime<Utc>,
    /// Dividends, defaults to 0.0.
    pub dividends: f64,
    /// Stock splits, defaults to 0.0.
    pub stock_splits: f64,
    /// String-encoded JSON with no strict structure. Always a string on the
    /// wire, defaulting to "" when omitted.
    pub metadata: String,
    /// Stamped at validation time when absent; preserved when present so
    /// re-validation does not drift.
    pub insertion_timestamp: DateTime<Utc>,
    /// Soft-delete flag. Not settable by callers; always false on ingest.
    pub is_deleted: bool,
}

impl PriceRecord {
    /// Serializes the record to the JSON object published to the queue.
    #[must_use]
    pub fn to_payload(&self) -> serde_json::Value {
        // Serialization of this struct cannot fail: all fields are plain
        // serde types with string/number/bool representations.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
