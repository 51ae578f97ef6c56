//! Record store, per-run cache and query language for habit tracking data.
//!
//! The pieces fit together like this:
//!
//! - [`JsonDirStore`] reads a category's records from JSON files.
//! - [`RecordCache`] memoizes those loads for the lifetime of one run.
//! - [`query`] parses expressions such as `food => food ~ 'vitamin' every 1d`
//!   and evaluates them against cached records.

mod cache;
pub mod query;
mod record;
mod store;

pub use cache::RecordCache;
pub use record::{parse_timestamp, Record};
pub use store::{suggest_category, JsonDirStore, RecordSource, StoreError, StoreResult};
