//! Tracked event records.
//!
//! A [`Record`] is one logged occurrence in a category. Its attributes vary by
//! category, so they are kept as a JSON object; the only attribute the rest of
//! the crate relies on is the timestamp, which is located and parsed once when
//! the record is built.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Keys checked, in order, when no timestamp field is configured for a category.
const TIMESTAMP_KEYS: &[&str] = &["when", "timestamp", "datetime", "at", "date"];

/// Naive datetime formats accepted in addition to RFC 3339.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// A single logged event belonging to a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// The category this record was loaded for.
    pub category: String,

    /// When the event happened.
    pub timestamp: DateTime<Utc>,

    /// Name of the attribute the timestamp was read from.
    pub timestamp_field: String,

    /// All attributes of the record, including the timestamp attribute.
    pub fields: Map<String, Value>,
}

impl Record {
    /// Builds a record from a JSON object.
    ///
    /// When `timestamp_field` is `None` the timestamp is located by trying the
    /// conventional keys first and then every field in order. Returns `None`
    /// if the value is not an object or has no parseable timestamp.
    pub fn from_value(
        category: impl Into<String>,
        value: Value,
        timestamp_field: Option<&str>,
    ) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };

        let (field, timestamp) = match timestamp_field {
            Some(key) => (key.to_string(), fields.get(key).and_then(parse_timestamp)?),
            None => locate_timestamp(&fields)?,
        };

        Some(Self {
            category: category.into(),
            timestamp,
            timestamp_field: field,
            fields,
        })
    }

    /// Returns the value of an attribute.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the timestamp as Unix epoch seconds.
    pub fn epoch(&self) -> i64 {
        self.timestamp.timestamp()
    }

    /// Iterates over all attributes except the timestamp, in stored order.
    pub fn other_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields
            .iter()
            .filter(move |(k, _)| **k != self.timestamp_field)
    }
}

fn locate_timestamp(fields: &Map<String, Value>) -> Option<(String, DateTime<Utc>)> {
    for key in TIMESTAMP_KEYS {
        if let Some(ts) = fields.get(*key).and_then(parse_timestamp) {
            return Some((key.to_string(), ts));
        }
    }

    // Integers only count as timestamps under a conventional key.
    fields
        .iter()
        .filter(|(_, v)| v.is_string())
        .find_map(|(k, v)| parse_timestamp(v).map(|ts| (k.clone(), ts)))
}

/// Parses a JSON value as a timestamp.
///
/// Accepts RFC 3339 strings, naive `YYYY-MM-DD HH:MM:SS` strings and plain
/// dates (both interpreted in local time), and integer epoch seconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return local_to_utc(naive);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(local_to_utc)
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_uses_conventional_key() {
        let record = Record::from_value(
            "food",
            json!({"food": "apple", "when": "2024-03-01T08:30:00Z"}),
            None,
        )
        .unwrap();

        assert_eq!(record.category, "food");
        assert_eq!(record.timestamp_field, "when");
        assert_eq!(record.epoch(), 1_709_281_800);
    }

    #[test]
    fn test_from_value_uses_configured_field() {
        let record = Record::from_value(
            "weight",
            json!({"logged": 1_700_000_000, "when": "2024-03-01T08:30:00Z"}),
            Some("logged"),
        )
        .unwrap();

        assert_eq!(record.timestamp_field, "logged");
        assert_eq!(record.epoch(), 1_700_000_000);
    }

    #[test]
    fn test_from_value_falls_back_to_any_timestamp_field() {
        let record = Record::from_value(
            "shower",
            json!({"kind": "cold", "started": "2024-01-02T00:00:00+01:00"}),
            None,
        )
        .unwrap();

        assert_eq!(record.timestamp_field, "started");
        assert_eq!(record.epoch(), 1_704_150_000);
    }

    #[test]
    fn test_fallback_ignores_integer_fields() {
        assert!(Record::from_value("water", json!({"glasses": 3}), None).is_none());
    }

    #[test]
    fn test_from_value_without_timestamp() {
        assert!(Record::from_value("food", json!({"food": "apple"}), None).is_none());
        assert!(Record::from_value("food", json!(["not", "an", "object"]), None).is_none());
    }

    #[test]
    fn test_configured_field_missing() {
        let value = json!({"when": "2024-03-01T08:30:00Z"});
        assert!(Record::from_value("food", value, Some("logged")).is_none());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp(&json!("2024-03-01T08:30:00Z")).is_some());
        assert!(parse_timestamp(&json!("2024-03-01 08:30:00")).is_some());
        assert!(parse_timestamp(&json!("2024-03-01T08:30:00")).is_some());
        assert!(parse_timestamp(&json!("2024-03-01")).is_some());
        assert!(parse_timestamp(&json!(0)).is_some());
        assert!(parse_timestamp(&json!("apple")).is_none());
        assert!(parse_timestamp(&json!(true)).is_none());
        assert!(parse_timestamp(&json!(1.5)).is_none());
    }

    #[test]
    fn test_other_fields_skips_timestamp() {
        let record = Record::from_value(
            "food",
            json!({"food": "apple", "when": "2024-03-01T08:30:00Z", "quantity": 2}),
            None,
        )
        .unwrap();

        let keys: Vec<&str> = record.other_fields().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["food", "quantity"]);
    }
}
