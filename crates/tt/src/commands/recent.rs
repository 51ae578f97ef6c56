//! Recent command implementation.
//!
//! Lists the newest records of one category.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use tally_store::{Record, RecordCache, RecordSource};

use super::{CommandContext, Result};
use crate::output::{format_records_json, format_records_table};

/// Returns up to `count` records dated at or before `now`, newest first.
pub fn most_recent(records: &[Record], count: usize, now: DateTime<Utc>) -> Vec<&Record> {
    records
        .iter()
        .rev()
        .filter(|r| r.timestamp <= now)
        .take(count)
        .collect()
}

/// Loads a category through the cache and returns its newest records.
pub fn query_recent<'c, S: RecordSource>(
    cache: &'c mut RecordCache<S>,
    category: &str,
    count: usize,
    now: DateTime<Utc>,
) -> Result<Vec<&'c Record>> {
    let records = cache.get(category)?;
    Ok(most_recent(records, count, now))
}

/// Executes the recent command.
pub fn execute(ctx: &CommandContext, category: &str, count: usize) -> Result<()> {
    let mut cache = RecordCache::new(ctx.config.open_store()?);
    let records = query_recent(&mut cache, category, count, Utc::now())?;

    let output = if ctx.json_output {
        format_records_json(&records)?
    } else {
        format_records_table(&records)
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
