//! Record storage backed by a directory of JSON files.
//!
//! Each category is stored as one or more files in the data directory:
//! `food.json`, `food.jsonl`, or sharded variants such as
//! `food@laptop-2024-03.json`. Category names may contain `-`, so shards are
//! separated by `@`, which a category name cannot contain. `.json` files hold a single array of objects,
//! `.jsonl` files hold one object per line.
//!
//! The default data directory is the XDG data directory for `tally`
//! (`~/.local/share/tally` on Linux).

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_json::Value;
use strsim::levenshtein;
use thiserror::Error;
use tracing::{debug, warn};

use crate::Record;

/// Application qualifier (for XDG paths).
const QUALIFIER: &str = "";

/// Application organization (for XDG paths).
const ORGANIZATION: &str = "";

/// Application name (for XDG paths).
const APPLICATION: &str = "tally";

/// Separates a category name from a shard suffix in a file stem.
const SHARD_SEPARATOR: char = '@';

/// Maximum Levenshtein distance to consider a category name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Errors that can occur while reading records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to determine the XDG data directory.
    #[error("failed to determine data directory: no valid home directory found")]
    NoDataDir,

    /// I/O error while reading the data directory or a data file.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A data file did not contain valid JSON.
    #[error("invalid JSON in '{path}': {source}")]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A source of records, keyed by category.
pub trait RecordSource {
    /// Loads every record for a category, oldest first.
    fn load(&self, category: &str) -> StoreResult<Vec<Record>>;

    /// Lists the categories this source knows about.
    fn categories(&self) -> StoreResult<Vec<String>>;
}

/// Reads records from JSON files in a data directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
    timestamp_fields: HashMap<String, String>,
}

impl JsonDirStore {
    /// Creates a store reading from the default XDG data directory.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoDataDir` if the home directory cannot be determined.
    pub fn new() -> StoreResult<Self> {
        Ok(Self::with_dir(Self::default_dir()?))
    }

    /// Creates a store reading from a custom directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            timestamp_fields: HashMap::new(),
        }
    }

    /// Sets the attribute holding the timestamp for a category.
    pub fn with_timestamp_field(
        mut self,
        category: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.timestamp_fields.insert(category.into(), field.into());
        self
    }

    /// Returns the default XDG data directory.
    pub fn default_dir() -> StoreResult<PathBuf> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or(StoreError::NoDataDir)?;
        Ok(project_dirs.data_dir().to_path_buf())
    }

    /// Returns the data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lists the data files in the directory, sorted by name.
    ///
    /// A missing directory is treated as empty.
    fn data_files(&self) -> StoreResult<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.dir.clone(),
                    source: e,
                })
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Read {
                path: self.dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_file() && DataFormat::of(&path).is_some() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Parses one data file into records.
    fn read_file(&self, category: &str, path: &Path) -> StoreResult<Vec<Record>> {
        let contents = fs::read_to_string(path).map_err(|e| StoreError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let parse_err = |source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let values: Vec<Value> = match DataFormat::of(path) {
            Some(DataFormat::Json) => {
                if contents.trim().is_empty() {
                    Vec::new()
                } else {
                    serde_json::from_str(&contents).map_err(parse_err)?
                }
            }
            Some(DataFormat::JsonLines) => contents
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(serde_json::from_str)
                .collect::<Result<_, _>>()
                .map_err(parse_err)?,
            None => Vec::new(),
        };

        let timestamp_field = self.timestamp_fields.get(category).map(String::as_str);
        let mut records = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match Record::from_value(category, value, timestamp_field) {
                Some(record) => records.push(record),
                None => warn!(
                    path = %path.display(),
                    index,
                    "skipping record without a timestamp"
                ),
            }
        }
        Ok(records)
    }
}

impl RecordSource for JsonDirStore {
    fn load(&self, category: &str) -> StoreResult<Vec<Record>> {
        let files: Vec<PathBuf> = self
            .data_files()?
            .into_iter()
            .filter(|path| file_category(path).is_some_and(|c| belongs_to(c, category)))
            .collect();

        if files.is_empty() {
            let known = self.categories()?;
            match suggest_category(category, &known) {
                Some(suggestion) => warn!(
                    category,
                    "no data files for category, did you mean '{suggestion}'?"
                ),
                None => warn!(category, "no data files for category"),
            }
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for path in &files {
            records.extend(self.read_file(category, path)?);
        }
        records.sort_by_key(|r| r.timestamp);

        debug!(
            category,
            files = files.len(),
            records = records.len(),
            "loaded category"
        );
        Ok(records)
    }

    fn categories(&self) -> StoreResult<Vec<String>> {
        let names: BTreeSet<String> = self
            .data_files()?
            .iter()
            .filter_map(|path| file_category(path))
            .map(|stem| category_of(stem).to_string())
            .collect();
        Ok(names.into_iter().collect())
    }
}

/// File formats understood by [`JsonDirStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataFormat {
    Json,
    JsonLines,
}

impl DataFormat {
    fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            "jsonl" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Returns the file stem, which carries the category name.
fn file_category(path: &Path) -> Option<&str> {
    path.file_stem()?.to_str()
}

/// Strips any shard suffix from a file stem.
fn category_of(stem: &str) -> &str {
    stem.split_once(SHARD_SEPARATOR)
        .map_or(stem, |(category, _)| category)
}

/// True if a file stem is the category itself or a shard of it.
fn belongs_to(stem: &str, category: &str) -> bool {
    category_of(stem) == category
}

/// Finds the closest known category name, if it is close enough to be a typo.
pub fn suggest_category<'a>(category: &str, known: &'a [String]) -> Option<&'a str> {
    let query = category.to_lowercase();

    let (best, distance) = known
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| (name.as_str(), levenshtein(&query, &name.to_lowercase())))
        .min_by_key(|(_, d)| *d)?;

    if distance > 0 && distance <= MAX_SUGGESTION_DISTANCE {
        Some(best)
    } else {
        None
    }
}
