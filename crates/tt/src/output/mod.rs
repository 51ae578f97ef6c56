//! Output formatting utilities for the tt CLI.
//!
//! - [`results`] - Query result output (table, names, JSON lines, notification text)
//! - [`recent`] - Record listings for the recent command
//! - [`helpers`] - Common formatting utilities (relative times, truncation)

pub mod helpers;
mod recent;
mod results;

pub use recent::{format_records_json, format_records_table};
pub use results::{
    format_notification_line, format_results_json, format_results_names, format_results_table,
};
