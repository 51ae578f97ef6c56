//! Query result output formatting.

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use tally_store::query::QueryOutput;

use super::helpers::{format_relative, truncate_str};
use crate::silence::SilenceList;

/// Widest name column before names are truncated.
const MAX_NAME_WIDTH: usize = 30;

/// Width of the "last" column.
const LAST_WIDTH: usize = 14;

/// Formats results as JSON lines, one object per result.
pub fn format_results_json(results: &[QueryOutput]) -> serde_json::Result<String> {
    let mut output = String::new();
    for result in results {
        output.push_str(&serde_json::to_string(result)?);
        output.push('\n');
    }
    Ok(output)
}

/// Formats results as one name per line.
pub fn format_results_names(results: &[QueryOutput]) -> String {
    results.iter().map(|r| format!("{}\n", r.name)).collect()
}

/// Formats results as an aligned table.
///
/// Empty input produces empty output.
pub fn format_results_table(
    results: &[QueryOutput],
    silenced: &SilenceList,
    now: DateTime<Utc>,
    use_colors: bool,
) -> String {
    if results.is_empty() {
        return String::new();
    }

    let name_width = results
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .clamp("Name".len(), MAX_NAME_WIDTH);

    let mut output = String::new();

    let header = format!(
        "{:<name_width$}  {:<LAST_WIDTH$}  {}",
        "Name", "Last", "Due"
    );
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for result in results {
        // pad before coloring so escape codes do not skew alignment
        let name = format!(
            "{:<name_width$}",
            truncate_str(&result.name, MAX_NAME_WIDTH)
        );
        let last = format!("{:<LAST_WIDTH$}", format_relative(result.epoch, now));
        let due = match result.next_epoch {
            Some(next) => format_relative(next, now),
            None => "-".to_string(),
        };
        let is_silenced = silenced.contains(&result.name);

        let line = if use_colors {
            let due = if result.expired && !is_silenced {
                due.red().bold().to_string()
            } else if result.expired {
                due.yellow().to_string()
            } else {
                due.green().to_string()
            };
            let name = if is_silenced {
                name.dimmed().to_string()
            } else {
                name
            };
            format!("{name}  {last}  {due}")
        } else {
            format!("{name}  {last}  {due}")
        };

        output.push_str(line.trim_end());
        if is_silenced {
            let marker = "(silenced)";
            if use_colors {
                output.push_str(&format!(" {}", marker.dimmed()));
            } else {
                output.push(' ');
                output.push_str(marker);
            }
        }
        output.push('\n');
    }

    output
}

/// Formats the human-readable line sent for one expired result.
pub fn format_notification_line(result: &QueryOutput, now: DateTime<Utc>) -> String {
    let mut line = format!("{}: last {}", result.name, format_relative(result.epoch, now));
    if let Some(next) = result.next_epoch {
        line.push_str(&format!(", due {}", format_relative(next, now)));
    }
    line
}
