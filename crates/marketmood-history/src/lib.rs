//! # Market Mood History
//!
//! Durable, deduplicated historical record of computed risk scores.
//!
//! The store is a single JSON file `{"history": [entries...]}` rewritten in
//! full on every append. Writes are guarded by a lock file and land via a
//! temp-file-then-rename so a crash mid-write never corrupts the log and
//! two concurrent writers never silently drop each other's entries: each
//! writer re-reads the file under the lock before merging its own entry in.
//!
//! Lookback queries (`yesterday` / `last_week` / `last_month`) resolve with
//! **sequential exclusion**: once an entry has answered one lookback it is
//! out of consideration for the rest of the batch, so sparse history never
//! shows the identical value under two different labels.

mod error;
mod models;

pub use error::HistoryError;
pub use models::{HistoricalLookups, HistoricalScoreEntry, Lookback};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use time::{Duration, OffsetDateTime};

/// Entries older than this are pruned on every append.
pub const RETENTION: Duration = Duration::days(90);

/// A lookback answer must lie within this window around its target.
pub const LOOKBACK_TOLERANCE: Duration = Duration::hours(12);

const LOCK_ATTEMPTS: u32 = 50;
const LOCK_RETRY_WAIT: std::time::Duration = std::time::Duration::from_millis(20);

#[derive(Debug, Serialize, Deserialize)]
struct HistoryFile {
    history: Vec<HistoricalScoreEntry>,
}

/// File-backed rolling score history.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    retention: Duration,
    tolerance: Duration,
}

impl HistoryStore {
    /// Opens a store at `path`; the file is created lazily on first append.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retention: RETENTION,
            tolerance: LOOKBACK_TOLERANCE,
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends an entry and prunes everything older than the retention
    /// window in the same write.
    ///
    /// The read-merge-write runs under the lock file, so a concurrent
    /// writer's entry observed on re-read survives the merge; the sequence
    /// stays sorted by timestamp.
    pub fn append(&self, entry: HistoricalScoreEntry) -> Result<(), HistoryError> {
        let now = OffsetDateTime::now_utc();
        self.append_at(entry, now)
    }

    fn append_at(&self, entry: HistoricalScoreEntry, now: OffsetDateTime) -> Result<(), HistoryError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| self.io_error(source))?;
        }

        let _lock = LockGuard::acquire(&self.lock_path())?;

        let mut entries = self.read_entries_tolerant();
        entries.push(entry);
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        let cutoff = now - self.retention;
        let before = entries.len();
        entries.retain(|e| e.timestamp > cutoff);
        if entries.len() < before {
            tracing::debug!(pruned = before - entries.len(), "retention prune");
        }

        self.write_atomic(&entries)
    }

    /// Full ordered history; a missing or corrupt file reads as empty.
    pub fn load(&self) -> Result<Vec<HistoricalScoreEntry>, HistoryError> {
        Ok(self.read_entries_tolerant())
    }

    /// Resolves all lookback comparison points in one batch.
    ///
    /// Candidates resolve in fixed order (yesterday, last week, last
    /// month); each picks the unclaimed entry closest to its target offset
    /// within the tolerance window. The latest entry is claimed up front as
    /// "now" so it never doubles as a historical answer.
    pub fn lookups(&self, now: OffsetDateTime) -> Result<HistoricalLookups, HistoryError> {
        let entries = self.read_entries_tolerant();
        let mut claimed = vec![false; entries.len()];

        let mut result = HistoricalLookups::default();
        if let Some(last) = entries.len().checked_sub(1) {
            claimed[last] = true;
            result.now = Some(entries[last].clone());
        }

        for lookback in Lookback::ALL {
            let target = now - lookback.offset();
            let mut best: Option<(usize, Duration)> = None;

            for (index, entry) in entries.iter().enumerate() {
                if claimed[index] {
                    continue;
                }
                let distance = (entry.timestamp - target).abs();
                if distance > self.tolerance {
                    continue;
                }
                if best.map_or(true, |(_, current)| distance < current) {
                    best = Some((index, distance));
                }
            }

            if let Some((index, _)) = best {
                claimed[index] = true;
                let entry = entries[index].clone();
                match lookback {
                    Lookback::Yesterday => result.yesterday = Some(entry),
                    Lookback::LastWeek => result.last_week = Some(entry),
                    Lookback::LastMonth => result.last_month = Some(entry),
                }
            }
        }

        Ok(result)
    }

    fn read_entries_tolerant(&self) -> Vec<HistoricalScoreEntry> {
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "failed to read history file");
                return Vec::new();
            }
        };

        match serde_json::from_str::<HistoryFile>(&body) {
            Ok(file) => file.history,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "corrupt history file reads as empty");
                Vec::new()
            }
        }
    }

    fn write_atomic(&self, entries: &[HistoricalScoreEntry]) -> Result<(), HistoryError> {
        let body = serde_json::to_vec_pretty(&HistoryFile {
            history: entries.to_vec(),
        })?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| self.io_error(source))?;
        tmp.write_all(&body).map_err(|source| self.io_error(source))?;
        tmp.persist(&self.path)
            .map_err(|persist| self.io_error(persist.error))?;
        Ok(())
    }

    fn lock_path(&self) -> PathBuf {
        let mut path = self.path.clone();
        path.set_extension("lock");
        path
    }

    fn io_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Exclusive-create lock file released on drop.
struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    fn acquire(path: &Path) -> Result<Self, HistoryError> {
        for _ in 0..LOCK_ATTEMPTS {
            match fs::OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(_) => {
                    return Ok(Self {
                        path: path.to_path_buf(),
                    })
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    std::thread::sleep(LOCK_RETRY_WAIT);
                }
                Err(source) => {
                    return Err(HistoryError::Io {
                        path: path.display().to_string(),
                        source,
                    })
                }
            }
        }

        Err(HistoryError::LockContended {
            path: path.display().to_string(),
            attempts: LOCK_ATTEMPTS,
        })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
