//! Process-lifetime record cache.

use std::collections::HashMap;

use tracing::debug;

use crate::store::{RecordSource, StoreResult};
use crate::Record;

/// Read-through cache of records, keyed by category.
///
/// The first [`get`](RecordCache::get) for a category loads it from the
/// underlying [`RecordSource`]; every later call returns the same snapshot
/// without touching the source. Entries are never invalidated, so a cache
/// should live for exactly one unit of work (one CLI invocation).
///
/// All access goes through `&mut self`. Wrap it in a lock if it ever needs to
/// be shared across threads.
#[derive(Debug)]
pub struct RecordCache<S> {
    source: S,
    entries: HashMap<String, Vec<Record>>,
    loads: usize,
}

impl<S: RecordSource> RecordCache<S> {
    /// Creates an empty cache over a record source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            entries: HashMap::new(),
            loads: 0,
        }
    }

    /// Returns the records for a category, loading them on first access.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the first load fails. A failed load is
    /// not cached, so a later call will try again.
    pub fn get(&mut self, category: &str) -> StoreResult<&[Record]> {
        if !self.entries.contains_key(category) {
            let records = self.source.load(category)?;
            self.loads += 1;
            debug!(category, records = records.len(), "cached category");
            self.entries.insert(category.to_string(), records);
        }

        Ok(self
            .entries
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// Returns true if the category has already been loaded.
    pub fn is_cached(&self, category: &str) -> bool {
        self.entries.contains_key(category)
    }

    /// Returns how many times the source has been read.
    pub fn loads(&self) -> usize {
        self.loads
    }

    /// Returns the underlying record source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
