//! Shared test utilities for the cloudaudit workspace.
//!
//! Integration tests compare CLI output against golden JSON; capture timestamps are the only
//! nondeterministic part of an audit record.

use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const TIMESTAMP_PLACEHOLDER: &str = "__TIMESTAMP__";

/// Replace the `time` field of every audit record (an object carrying `physicalId`) with a
/// placeholder, at any depth.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    normalize_recursive(&mut value);
    value
}

fn normalize_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.contains_key("physicalId") && map.contains_key("time") {
                map.insert(
                    "time".to_string(),
                    Value::String(TIMESTAMP_PLACEHOLDER.to_string()),
                );
            }
            for val in map.values_mut() {
                normalize_recursive(val);
            }
        }
        Value::Array(arr) => {
            for val in arr.iter_mut() {
                normalize_recursive(val);
            }
        }
        _ => {}
    }
}

/// Parse every record's `time` as RFC 3339, in array order.
///
/// Returns an error naming the first record whose time is missing or malformed.
pub fn record_times(records: &Value) -> Result<Vec<OffsetDateTime>, String> {
    let arr = records
        .as_array()
        .ok_or_else(|| "expected a JSON array of records".to_string())?;
    arr.iter()
        .enumerate()
        .map(|(idx, record)| {
            let raw = record
                .get("time")
                .and_then(Value::as_str)
                .ok_or_else(|| format!("record {idx} has no time"))?;
            OffsetDateTime::parse(raw, &Rfc3339)
                .map_err(|e| format!("record {idx} time {raw:?}: {e}"))
        })
        .collect()
}
