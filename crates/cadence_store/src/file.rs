//! File-based backend with atomic writes and a directory lock.

use crate::backend::{Slot, SnapshotBackend};
use crate::error::{StoreError, StoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const SNAPSHOT_FILE: &str = "snapshot.json";
const CURSOR_FILE: &str = "sync_cursor";
const LOCK_FILE: &str = "LOCK";

/// A file-based backend storing each document in the data directory.
///
/// # Layout
///
/// ```text
/// <dir>/
/// ├─ snapshot.json   # the full application snapshot
/// ├─ sync_cursor     # last-successful-sync timestamp
/// └─ LOCK            # advisory lock for single-writer
/// ```
///
/// # Durability
///
/// Writes go to a temp file, are synced to disk, and are renamed over
/// the target, so a crash mid-write leaves the previous document intact
/// and a reader never observes a torn document.
///
/// # Locking
///
/// The backend holds an exclusive advisory lock on `LOCK` for its whole
/// lifetime. Opening a second backend on the same directory fails with
/// [`StoreError::Locked`].
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    _lock_file: File,
}

impl FileBackend {
    /// Opens a backend on the given data directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] if another process (or another
    /// backend in this process) holds the directory lock, or an I/O
    /// error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))?;

        // Non-blocking: a held lock means another writer owns this directory.
        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked);
        }

        Ok(Self {
            dir,
            _lock_file: lock_file,
        })
    }

    /// Returns the data directory path.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, slot: Slot) -> PathBuf {
        match slot {
            Slot::Snapshot => self.dir.join(SNAPSHOT_FILE),
            Slot::SyncCursor => self.dir.join(CURSOR_FILE),
        }
    }
}

impl SnapshotBackend for FileBackend {
    fn read(&self, slot: Slot) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(self.path_for(slot)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn write(&self, slot: Slot, bytes: &[u8]) -> StoreResult<()> {
        let target = self.path_for(slot);
        let tmp = target.with_extension("tmp");

        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &target)?;
        Ok(())
    }

    fn wipe(&self, slot: Slot) -> StoreResult<()> {
        match fs::remove_file(self.path_for(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
