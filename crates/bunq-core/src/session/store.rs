//! Persistence of the session token across process runs.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The persisted form of a session token.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Session token as issued by the session server.
    pub token: String,
    /// [`InstallationContext::installation_id`](crate::InstallationContext::installation_id) of
    /// the installation the token was issued to.
    pub installation_id: String,
    #[allow(missing_docs)]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub session_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub user_id: Option<u64>,
}

/// A session file exists but could not be parsed.
#[derive(Debug, Error)]
#[error("Session record at {} is corrupt: {source}", path.display())]
pub struct StoreCorruptError {
    #[allow(missing_docs)]
    pub path: PathBuf,
    #[source]
    #[allow(missing_docs)]
    pub source: serde_json::Error,
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Corrupt(#[from] StoreCorruptError),

    #[error("Failed to access session store at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize session record: {0}")]
    Serialize(#[source] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// JSON file holding at most one [`SessionRecord`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    history_dir: Option<PathBuf>,
}

impl SessionStore {
    /// Store the session record at `path`. Missing parent directories are created on save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            history_dir: None,
        }
    }

    /// Archive every replaced record into `history_dir`. Archived records are never read back.
    pub fn with_history_dir(mut self, history_dir: impl Into<PathBuf>) -> Self {
        self.history_dir = Some(history_dir.into());
        self
    }

    #[allow(missing_docs)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored record, `None` when there is none.
    pub fn load(&self) -> Result<Option<SessionRecord>, StoreError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No stored session");
                return Ok(None);
            }
            Err(e) => return Err(io_error(&self.path)(e)),
        };

        let record = serde_json::from_slice(&content).map_err(|source| StoreCorruptError {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(record))
    }

    /// Replace the stored record. The file is written next to its destination and renamed over
    /// it, so readers only ever see a complete record.
    pub fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(io_error(dir))?;

        self.archive_current();

        let content = serde_json::to_vec_pretty(record).map_err(StoreError::Serialize)?;
        let mut file = NamedTempFile::new_in(dir).map_err(io_error(dir))?;
        io::Write::write_all(&mut file, &content).map_err(io_error(file.path()))?;
        file.as_file().sync_all().map_err(io_error(file.path()))?;
        file.persist(&self.path)
            .map_err(|e| io_error(&self.path)(e.error))?;

        info!(path = %self.path.display(), "Stored session");
        Ok(())
    }

    /// Remove the stored record, archiving it first when a history directory is set. Does
    /// nothing when there is none.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.archive_current();

        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Cleared stored session");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No stored session to clear");
                Ok(())
            }
            Err(e) => Err(io_error(&self.path)(e)),
        }
    }

    /// Remove the history directory and every archived record in it.
    pub fn clear_history(&self) -> Result<(), StoreError> {
        let Some(dir) = &self.history_dir else {
            return Ok(());
        };
        match fs::remove_dir_all(dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(dir)(e)),
        }
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Copy the current record into the history directory. Failures are logged, not returned.
    fn archive_current(&self) {
        let Some(dir) = &self.history_dir else {
            return;
        };
        let record = match self.load() {
            Ok(Some(record)) => record,
            Ok(None) => return,
            Err(e) => {
                warn!("Not archiving unreadable session record: {e}");
                return;
            }
        };

        match archive(dir, &record) {
            Ok(path) => debug!(path = %path.display(), "Archived previous session"),
            Err(e) => warn!("Failed to archive previous session: {e}"),
        }
    }
}

/// Write `record` as `<created_at>-<session_id|unknown>.json` into `dir`, adding a `-<n>` suffix
/// when that name is taken. Existing archives are never overwritten.
fn archive(dir: &Path, record: &SessionRecord) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let content = serde_json::to_vec_pretty(record)?;
    let stem = format!(
        "{}-{}",
        record.created_at.timestamp(),
        record
            .session_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );

    for attempt in 0u32.. {
        let path = match attempt {
            0 => dir.join(format!("{stem}.json")),
            n => dir.join(format!("{stem}-{n}.json")),
        };
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                io::Write::write_all(&mut file, &content)?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(io::ErrorKind::AlreadyExists, "no free archive name"))
}
