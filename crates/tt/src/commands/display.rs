//! Display command implementation.
//!
//! Renders the JSON-line result stream produced by `tt when`.

use std::io::{self, BufRead, Write};

use chrono::Utc;
use tally_store::query::QueryOutput;
use tracing::debug;

use super::{CommandContext, CommandError, Result};
use crate::cli::{OutputFormat, SortKey, SortOrder};
use crate::output::{format_results_json, format_results_names, format_results_table};
use crate::silence::SilenceList;

/// Options for the display command.
#[derive(Debug, Clone, Copy)]
pub struct DisplayOptions {
    /// How to render results.
    pub output_format: OutputFormat,
    /// Sort key.
    pub sort_key: SortKey,
    /// Sort direction.
    pub order: SortOrder,
    /// Keep only expired results that are not silenced.
    pub expired: bool,
    /// Drop silenced results.
    pub hide_silenced: bool,
}

/// Reads a JSON-line result stream. Blank lines are skipped.
pub fn read_results<R: BufRead>(reader: R) -> Result<Vec<QueryOutput>> {
    let mut results = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let result = serde_json::from_str(&line)
            .map_err(|e| CommandError::Input(format!("line {}: {}", index + 1, e)))?;
        results.push(result);
    }
    Ok(results)
}

/// Applies the expired and silenced filters.
pub fn filter_results(
    results: Vec<QueryOutput>,
    silenced: &SilenceList,
    expired_only: bool,
    hide_silenced: bool,
) -> Vec<QueryOutput> {
    results
        .into_iter()
        .filter(|r| !expired_only || (r.expired && !silenced.contains(&r.name)))
        .filter(|r| !hide_silenced || !silenced.contains(&r.name))
        .collect()
}

/// Sorts results in place. Ties keep their input order.
pub fn sort_results(results: &mut [QueryOutput], key: SortKey, order: SortOrder) {
    results.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Epoch => a.epoch.cmp(&b.epoch),
            // results without a due time sort first
            SortKey::NextEpoch => a.next_epoch.cmp(&b.next_epoch),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Executes the display command.
pub fn execute(ctx: &CommandContext, opts: &DisplayOptions) -> Result<()> {
    let results = read_results(io::stdin().lock())?;
    let silenced = SilenceList::load(ctx.config.resolve_silence_file().as_deref())?;

    let total = results.len();
    let mut results = filter_results(results, &silenced, opts.expired, opts.hide_silenced);
    sort_results(&mut results, opts.sort_key, opts.order);
    debug!(total, shown = results.len(), "displaying results");

    let format = if ctx.json_output {
        OutputFormat::Json
    } else {
        opts.output_format
    };
    let output = match format {
        OutputFormat::Json => format_results_json(&results)?,
        OutputFormat::Name => format_results_names(&results),
        OutputFormat::Table => {
            format_results_table(&results, &silenced, Utc::now(), ctx.use_colors)
        }
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
