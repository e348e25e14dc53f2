use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A video file discovered during scanning. Immutable after creation and
/// owned by exactly one [`DuplicateSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute remote path, forward-slash normalized.
    pub path: String,
    /// Modification time, when the provider supplied a parseable one.
    pub modified: Option<DateTime<Utc>>,
    pub size: u64,
    /// Uppercased content hash (SHA-1 length or longer).
    pub content_hash: String,
}

/// A group of files sharing the same content hash. Always has two or more
/// members; singleton hash groups are never materialized.
#[derive(Debug, Clone)]
pub struct DuplicateSet {
    pub content_hash: String,
    pub members: Vec<FileRecord>,
}

impl DuplicateSet {
    pub fn contains(&self, path: &str) -> bool {
        self.members.iter().any(|m| m.path == path)
    }

    pub fn wasted_bytes(&self) -> u64 {
        match self.members.first() {
            Some(first) => first.size * (self.members.len() as u64 - 1),
            None => 0,
        }
    }
}

/// Ordered by hash so set numbering, resolver logging, and report output are
/// deterministic across runs.
pub type DuplicateSets = BTreeMap<String, DuplicateSet>;

/// Counters accumulated over a whole scan, surfaced in the end-of-scan
/// summary.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub items_seen: u64,
    pub videos_processed: u64,
    pub attr_errors: u64,
    pub hash_skips: u64,
    pub unparsed_dates: u64,
    pub roots_scanned: usize,
    /// Roots whose scan-path calculation failed (skipped before walking).
    pub roots_skipped: usize,
    /// Roots whose directory walk raised mid-flight.
    pub roots_failed: usize,
    pub cancelled: bool,
}

/// Immutable snapshot produced by one scan. Discarded wholesale on the next.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub sets: DuplicateSets,
    pub stats: ScanStats,
}

impl ScanOutcome {
    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    pub fn file_count(&self) -> usize {
        self.sets.values().map(|s| s.members.len()).sum()
    }
}

/// Result of one deletion batch.
#[derive(Debug, Clone, Default)]
pub struct DeleteOutcome {
    pub deleted: usize,
    pub attempted: usize,
    /// Paths whose removal failed; never aborts the batch.
    pub failures: Vec<String>,
}
