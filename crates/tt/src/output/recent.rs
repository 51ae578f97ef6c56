//! Record listing output formatting.

use tally_store::Record;

use super::helpers::{format_local_time, format_value};

/// Formats records as tab-separated lines: the local timestamp, then the
/// remaining attribute values in stored order.
pub fn format_records_table(records: &[&Record]) -> String {
    let mut output = String::new();
    for record in records {
        output.push_str(&format_local_time(record.epoch()));
        for (_, value) in record.other_fields() {
            output.push('\t');
            output.push_str(&format_value(value));
        }
        output.push('\n');
    }
    output
}

/// Formats records as JSON lines of their attributes.
pub fn format_records_json(records: &[&Record]) -> serde_json::Result<String> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(&record.fields)?);
        output.push('\n');
    }
    Ok(output)
}
