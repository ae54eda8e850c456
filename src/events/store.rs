//! File-backed, capped event log.
//!
//! The log is a single pretty-printed JSON array, oldest event first. Writers
//! hold an exclusive advisory lock on a sidecar `.lock` file for the whole
//! read-modify-write and replace the log by renaming a temporary file over
//! it, so readers see either the old or the new log and never a torn one.

use super::models::Event;
use crate::error::{Error, Result};
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Maximum number of events kept in the log. Older events are evicted first.
pub const MAX_EVENTS: usize = 100;

/// Handle to the events file.
///
/// Holds no events in memory: every call goes back to the file, which is the
/// only state shared between the webhook receiver and the MCP server.
#[derive(Debug, Clone)]
pub struct EventStore {
    path: PathBuf,
}

impl EventStore {
    /// Create a store backed by the file at `path`.
    ///
    /// Nothing is created on disk until the first [`append`](Self::append).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the events file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the events file has been created yet.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the whole log, oldest first.
    ///
    /// A missing file is the first-run state and yields an empty log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptStore`] if the file is not a valid event log,
    /// or an I/O error if it cannot be read.
    pub fn read_all(&self) -> Result<Vec<Event>> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let _lock = self.lock(false)?;
        self.load()
    }

    /// Append one event, evicting the oldest entries beyond [`MAX_EVENTS`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptStore`] if the existing file is not a valid
    /// event log; the file is left untouched in that case. Returns an I/O
    /// error if the file cannot be locked, read or replaced.
    pub fn append(&self, event: Event) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let _lock = self.lock(true)?;

        let mut events = self.load()?;
        events.push(event);
        if events.len() > MAX_EVENTS {
            let excess = events.len() - MAX_EVENTS;
            events.drain(..excess);
        }

        self.replace(&events)?;
        tracing::debug!(path = %self.path.display(), count = events.len(), "event log written");
        Ok(())
    }

    /// Number of events currently in the log.
    ///
    /// # Errors
    ///
    /// Same as [`read_all`](Self::read_all).
    pub fn len(&self) -> Result<usize> {
        Ok(self.read_all()?.len())
    }

    /// Whether the log holds no events.
    ///
    /// # Errors
    ///
    /// Same as [`read_all`](Self::read_all).
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn load(&self) -> Result<Vec<Event>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content)
            .map_err(|source| Error::CorruptStore { path: self.path.clone(), source })
    }

    fn replace(&self, events: &[Event]) -> Result<()> {
        let temp_path = self.sibling(".tmp");
        {
            let mut file = File::create(&temp_path)?;
            serde_json::to_writer_pretty(&mut file, events)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn lock(&self, exclusive: bool) -> Result<LockGuard> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.sibling(".lock"))?;
        if exclusive {
            FileExt::lock_exclusive(&file)?;
        } else {
            FileExt::lock_shared(&file)?;
        }
        Ok(LockGuard { file })
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }
}

/// Releases the advisory lock when dropped.
struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
