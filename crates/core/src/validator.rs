//! Strict schema validation for inbound raw price records.
//!
//! Validation is exhaustive per record: every violated field constraint is
//! collected and reported together rather than stopping at the first
//! failure. Validation is a pure function of the raw input and the clock
//! value passed by the caller; it performs no I/O.

use crate::record::PriceRecord;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// A single violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// All field constraints violated by one raw record.
#[derive(Debug, Clone, Error)]
#[error("{}", self.summary())]
pub struct ValidationError {
    /// Every violated constraint, in schema field order.
    pub field_errors: Vec<FieldError>,
}

impl ValidationError {
    fn summary(&self) -> String {
        self.field_errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validates one raw record against the price record schema.
///
/// Applies defaults for optional fields, generates `id` when absent, and
/// stamps `insertion_timestamp` with `now` when absent. Fields already
/// present on an earlier-normalized record are preserved, so re-validating
/// a normalized record yields the same record.
///
/// # Errors
///
/// Returns a `ValidationError` listing every violated field constraint:
/// missing required field, wrong type, malformed timestamp, malformed id.
pub fn validate_record(raw: &Value, now: DateTime<Utc>) -> Result<PriceRecord, ValidationError> {
    let Some(object) = raw.as_object() else {
        return Err(ValidationError {
            field_errors: vec![FieldError::new("record", "must be a JSON object")],
        });
    };

    let mut errors = Vec::new();

    let id = optional_uuid(object, "id", &mut errors);
    let crypto_name = required_string(object, "crypto_name", &mut errors);
    let crypto_symbol = required_string(object, "crypto_symbol", &mut errors);
    let fiat_currency = required_string(object, "fiat_currency", &mut errors);
    let source = required_string(object, "source", &mut errors);
    let ticker = required_string(object, "ticker", &mut errors);
    let open = required_number(object, "open", &mut errors);
    let high = required_number(object, "high", &mut errors);
    let low = required_number(object, "low", &mut errors);
    let close = required_number(object, "close", &mut errors);
    let volume = required_number(object, "volume", &mut errors);
    let timestamp = required_timestamp(object, "timestamp", &mut errors);
    let dividends = optional_number(object, "dividends", 0.0, &mut errors);
    let stock_splits = optional_number(object, "stock_splits", 0.0, &mut errors);
    let metadata = optional_string(object, "metadata", &mut errors);
    let insertion_timestamp = optional_timestamp(object, "insertion_timestamp", now, &mut errors);
    // `is_deleted` and any unknown keys are ignored; the flag is never
    // settable by the caller.

    if !errors.is_empty() {
        return Err(ValidationError {
            field_errors: errors,
        });
    }

    Ok(PriceRecord {
        id: id.unwrap_or_else(Uuid::new_v4),
        crypto_name: crypto_name.unwrap_or_default(),
        crypto_symbol: crypto_symbol.unwrap_or_default(),
        fiat_currency: fiat_currency.unwrap_or_default(),
        source: source.unwrap_or_default(),
        ticker: ticker.unwrap_or_default(),
        open: open.unwrap_or_default(),
        high: high.unwrap_or_default(),
        low: low.unwrap_or_default(),
        close: close.unwrap_or_default(),
        volume: volume.unwrap_or_default(),
        timestamp: timestamp.unwrap_or(now),
        dividends,
        stock_splits,
        metadata,
        insertion_timestamp,
        is_deleted: false,
    })
}

fn required_string(object: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(field, "required field is missing"));
            None
        }
        Some(Value::String(s)) if s.is_empty() => {
            errors.push(FieldError::new(field, "must be a non-empty string"));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            errors.push(FieldError::new(
                field,
                format!("expected a string, got {}", json_type_name(other)),
            ));
            None
        }
    }
}

fn required_number(object: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<f64> {
    match object.get(field) {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(field, "required field is missing"));
            None
        }
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Some(v),
            _ => {
                errors.push(FieldError::new(field, "must be a finite number"));
                None
            }
        },
        Some(other) => {
            errors.push(FieldError::new(
                field,
                format!("expected a number, got {}", json_type_name(other)),
            ));
            None
        }
    }
}

fn optional_number(
    object: &Map<String, Value>,
    field: &str,
    default: f64,
    errors: &mut Vec<FieldError>,
) -> f64 {
    match object.get(field) {
        None | Some(Value::Null) => default,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => v,
            _ => {
                errors.push(FieldError::new(field, "must be a finite number"));
                default
            }
        },
        Some(other) => {
            errors.push(FieldError::new(
                field,
                format!("expected a number, got {}", json_type_name(other)),
            ));
            default
        }
    }
}

/// Optional string field, defaulting to "". An explicit null is coerced to
/// "" as well: the downstream queue schema never accepts a null here.
fn optional_string(object: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> String {
    match object.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            errors.push(FieldError::new(
                field,
                format!("expected a string, got {}", json_type_name(other)),
            ));
            String::new()
        }
    }
}

fn optional_uuid(object: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<Uuid> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match Uuid::parse_str(s) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(FieldError::new(field, format!("not a valid UUID: {s}")));
                None
            }
        },
        Some(other) => {
            errors.push(FieldError::new(
                field,
                format!("expected a UUID string, got {}", json_type_name(other)),
            ));
            None
        }
    }
}

fn required_timestamp(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<DateTime<Utc>> {
    match object.get(field) {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(field, "required field is missing"));
            None
        }
        Some(Value::String(s)) => parse_timestamp(s).map_or_else(
            || {
                errors.push(FieldError::new(
                    field,
                    format!("not a timezone-aware ISO-8601 timestamp: {s}"),
                ));
                None
            },
            Some,
        ),
        Some(other) => {
            errors.push(FieldError::new(
                field,
                format!("expected an ISO-8601 string, got {}", json_type_name(other)),
            ));
            None
        }
    }
}

fn optional_timestamp(
    object: &Map<String, Value>,
    field: &str,
    default: DateTime<Utc>,
    errors: &mut Vec<FieldError>,
) -> DateTime<Utc> {
    match object.get(field) {
        None | Some(Value::Null) => default,
        Some(Value::String(s)) => parse_timestamp(s).unwrap_or_else(|| {
            errors.push(FieldError::new(
                field,
                format!("not a timezone-aware ISO-8601 timestamp: {s}"),
            ));
            default
        }),
        Some(other) => {
            errors.push(FieldError::new(
                field,
                format!("expected an ISO-8601 string, got {}", json_type_name(other)),
            ));
            default
        }
    }
}

/// Parses an ISO-8601 timestamp. Accepts RFC 3339 with an explicit offset,
/// or the short `YYYY-MM-DD` form as midnight UTC. Naive date-times without
/// an offset are rejected.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
