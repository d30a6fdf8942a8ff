//! Loader and match index
//!
//! The index maps `service/method` keys to candidate records in log order.
//! It is built once and never mutated, so it can be shared across any number
//! of concurrent calls without locking.

use crate::document::IgnoreSet;
use crate::error::{MockError, Result};
use crate::record::{Record, read_log};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A record prepared for matching
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The captured record
    pub record: Record,
    /// Parsed ignore paths of the record
    pub ignore: IgnoreSet,
}

impl From<Record> for Candidate {
    fn from(record: Record) -> Self {
        let ignore = record.ignore_set();
        Self { record, ignore }
    }
}

/// Immutable lookup from `service/method` to ordered candidates
#[derive(Debug, Clone, Default)]
pub struct MatchIndex {
    entries: HashMap<String, Vec<Candidate>>,
    records: usize,
}

impl MatchIndex {
    /// Build an index from records, preserving their order per key
    pub fn from_records<I: IntoIterator<Item = Record>>(records: I) -> Self {
        let mut entries: HashMap<String, Vec<Candidate>> = HashMap::new();
        let mut count = 0;
        for record in records {
            count += 1;
            entries
                .entry(record.key())
                .or_default()
                .push(Candidate::from(record));
        }
        Self {
            entries,
            records: count,
        }
    }

    /// Load a capture log. Relative paths resolve against the working
    /// directory. Any undecodable record fails the whole load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = resolve_path(path.as_ref())?;
        let file = File::open(&path).map_err(|source| MockError::File {
            path: path.clone(),
            source,
        })?;

        let index = Self::from_records(read_log(file)?);

        for (key, candidates) in &index.entries {
            tracing::debug!(key = %key, candidates = candidates.len(), "loaded key");
        }
        tracing::info!(
            path = %path.display(),
            records = index.records,
            keys = index.entries.len(),
            "loaded capture log"
        );
        Ok(index)
    }

    /// Candidates for a key, in log order
    pub fn candidates(&self, key: &str) -> Option<&[Candidate]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.records
    }

    /// Number of distinct keys
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no records
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path))
}
