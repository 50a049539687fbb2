//! Durable on-disk fallback cache for the last fully live snapshot.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{MarketSnapshot, PersistenceError, UtcDateTime};

/// On-disk record: the snapshot plus the moment it was persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    pub saved_at: UtcDateTime,
    pub snapshot: MarketSnapshot,
}

/// Durable JSON fallback cache, overwritten after every fully live cycle.
///
/// Writes go through a temp file in the same directory followed by a rename,
/// so a crash mid-write never truncates the previous good copy and a
/// concurrent reader never observes a partial file. Last writer wins.
#[derive(Debug, Clone)]
pub struct FallbackStore {
    path: PathBuf,
}

impl FallbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, snapshot: &MarketSnapshot) -> Result<(), PersistenceError> {
        let record = StoredSnapshot {
            saved_at: UtcDateTime::now(),
            snapshot: snapshot.clone(),
        };
        let body = serde_json::to_vec_pretty(&record)?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|source| self.io_error(source))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| self.io_error(source))?;
        tmp.write_all(&body).map_err(|source| self.io_error(source))?;
        tmp.persist(&self.path)
            .map_err(|persist| self.io_error(persist.error))?;

        tracing::debug!(path = %self.path.display(), "fallback snapshot persisted");
        Ok(())
    }

    /// Reads the last persisted snapshot; a missing file is a normal cold
    /// start and a corrupt file is logged and treated as absent.
    pub fn load(&self) -> Option<StoredSnapshot> {
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "failed to read fallback cache");
                return None;
            }
        };

        match serde_json::from_str(&body) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "corrupt fallback cache ignored");
                None
            }
        }
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}
