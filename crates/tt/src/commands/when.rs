//! When command implementation.
//!
//! Runs query expressions against the record store and prints one JSON
//! object per result. All queries share one cache, so each category is
//! read at most once per invocation.

use std::io::{self, BufRead, BufWriter, IsTerminal, Write};

use chrono::{DateTime, Utc};
use tally_store::query::{Query, QueryParser};
use tally_store::{RecordCache, RecordSource};
use tracing::debug;

use super::{CommandContext, Result};

/// Message printed when there is nothing to run.
pub const NO_QUERIES: &str = "no queries provided";

/// Where the query texts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySource {
    Arguments,
    Stdin,
    Config,
}

/// Picks the query texts: arguments, then stdin lines, then the config file.
///
/// `stdin` is `None` when standard input is a terminal.
pub fn collect_queries<R: BufRead>(
    args: &[String],
    stdin: Option<R>,
    configured: &[String],
) -> io::Result<(QuerySource, Vec<String>)> {
    if !args.is_empty() {
        return Ok((QuerySource::Arguments, args.to_vec()));
    }

    if let Some(reader) = stdin {
        let mut queries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            queries.push(line.to_string());
        }
        if !queries.is_empty() {
            return Ok((QuerySource::Stdin, queries));
        }
    }

    Ok((QuerySource::Config, configured.to_vec()))
}

/// Parses query texts, reporting and skipping the invalid ones.
pub fn parse_queries(texts: &[String]) -> Vec<Query> {
    texts
        .iter()
        .filter_map(|text| match QueryParser::parse(text) {
            Ok(query) => Some(query),
            Err(e) => {
                eprintln!("Error: skipping query '{}': {}", text.trim(), e);
                None
            }
        })
        .collect()
}

/// Runs each query in order against the shared cache.
///
/// Returns the total number of result lines written.
pub fn run_queries<S: RecordSource, W: Write>(
    queries: &[Query],
    cache: &mut RecordCache<S>,
    now: DateTime<Utc>,
    out: &mut W,
) -> Result<usize> {
    let mut written = 0;
    for query in queries {
        written += query.run(cache, now, out)?;
    }
    debug!(
        queries = queries.len(),
        results = written,
        loads = cache.loads(),
        "finished queries"
    );
    Ok(written)
}

/// Executes the when command.
pub fn execute(ctx: &CommandContext, args: &[String]) -> Result<()> {
    let stdin = io::stdin();
    let reader = if stdin.is_terminal() {
        None
    } else {
        Some(stdin.lock())
    };

    let (source, texts) = collect_queries(args, reader, &ctx.config.queries)?;
    debug!(?source, count = texts.len(), "collected queries");

    let queries = parse_queries(&texts);
    if queries.is_empty() {
        if !ctx.quiet {
            eprintln!("{NO_QUERIES}");
        }
        return Ok(());
    }

    let store = ctx.config.open_store()?;
    let mut cache = RecordCache::new(store);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    run_queries(&queries, &mut cache, Utc::now(), &mut out)?;
    out.flush()?;

    Ok(())
}
