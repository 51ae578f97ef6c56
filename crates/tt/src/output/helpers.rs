//! Common helper functions for output formatting.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde_json::Value;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Formats a span of seconds as its largest whole unit, e.g. "3 days".
fn format_span(seconds: u64) -> String {
    let unit_of = |unit: i64| unit.unsigned_abs();
    let (amount, unit) = match seconds {
        s if s >= unit_of(WEEK) * 2 => (s / unit_of(WEEK), "week"),
        s if s >= unit_of(DAY) => (s / unit_of(DAY), "day"),
        s if s >= unit_of(HOUR) => (s / unit_of(HOUR), "hour"),
        s if s >= unit_of(MINUTE) => (s / unit_of(MINUTE), "minute"),
        s => (s, "second"),
    };

    if amount == 1 {
        format!("1 {unit}")
    } else {
        format!("{amount} {unit}s")
    }
}

/// Formats an epoch relative to `now`: "2 days ago", "in 5 hours" or "now".
///
/// Epochs come from untrusted input, so the difference saturates.
pub fn format_relative(epoch: i64, now: DateTime<Utc>) -> String {
    let delta = epoch.saturating_sub(now.timestamp());
    let span = delta.unsigned_abs();
    if span < MINUTE.unsigned_abs() {
        "now".to_string()
    } else if delta < 0 {
        format!("{} ago", format_span(span))
    } else {
        format!("in {}", format_span(span))
    }
}

/// Formats an epoch as local date and time, to the second.
pub fn format_local_time(epoch: i64) -> String {
    match Local.timestamp_opt(epoch, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => epoch.to_string(),
    }
}

/// Renders a JSON value for text output. Strings are printed unquoted.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
