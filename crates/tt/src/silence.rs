//! Silenced result names.
//!
//! The silence file lists one name per line. Surrounding whitespace is
//! trimmed, and blank lines and `#` comments are ignored.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

/// Names excluded from expiry notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SilenceList {
    names: HashSet<String>,
}

impl SilenceList {
    /// Parses the contents of a silence file.
    pub fn parse(content: &str) -> Self {
        let names = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { names }
    }

    /// Loads the silence file at `path`.
    ///
    /// No path, or a path that does not exist, yields an empty list.
    pub fn load(path: Option<&Path>) -> io::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => {
                let list = Self::parse(&content);
                debug!(path = %path.display(), names = list.len(), "loaded silence file");
                Ok(list)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "silence file not found");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Returns true if `name` is silenced.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of silenced names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing is silenced.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
