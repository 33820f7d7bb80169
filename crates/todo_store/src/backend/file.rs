//! File-based storage backend.
//!
//! A data directory has the following layout:
//!
//! ```text
//! <data_dir>/
//! ├─ LOCK              # Advisory lock for single-writer
//! └─ SNAPSHOT          # Latest committed snapshot
//! ```
//!
//! The LOCK file ensures only one process can write to the store at a time.

use super::StorageBackend;
use crate::error::{StoreError, StoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const SNAPSHOT_FILE: &str = "SNAPSHOT";
/// Temporary file for atomic snapshot writes.
const SNAPSHOT_TEMP: &str = "SNAPSHOT.tmp";

/// A storage backend that keeps the snapshot in a data directory.
///
/// The backend holds an exclusive lock on the directory for its whole
/// lifetime. Only one `FileBackend` can exist per directory at a time.
#[derive(Debug)]
pub struct FileBackend {
    /// Root directory path.
    path: PathBuf,
    /// Whether to fsync after every save.
    sync_on_save: bool,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
}

impl FileBackend {
    /// Opens or creates a data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - The path is not a directory
    /// - Another process holds the lock (returns `Locked`)
    /// - I/O errors occur
    pub fn open(path: &Path, create_if_missing: bool) -> StoreResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(StoreError::invalid_operation(format!(
                    "data directory does not exist: {}",
                    path.display()
                )));
            }
        }

        if !path.is_dir() {
            return Err(StoreError::invalid_operation(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            sync_on_save: true,
            _lock_file: lock_file,
        })
    }

    /// Sets whether each save is fsynced before it is considered complete.
    #[must_use]
    pub fn sync_on_save(mut self, value: bool) -> Self {
        self.sync_on_save = value;
        self
    }

    /// Returns the data directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path to the snapshot file.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.path.join(SNAPSHOT_FILE)
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> StoreResult<()> {
        File::open(&self.path)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StoreResult<()> {
        // NTFS journals metadata; directory handles cannot be fsynced.
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        let mut file = match File::open(self.snapshot_path()) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        if data.is_empty() {
            return Ok(None);
        }
        Ok(Some(data))
    }

    /// Saves the snapshot atomically.
    ///
    /// Uses write-then-rename:
    /// 1. Write to temporary file
    /// 2. Sync temporary file to disk
    /// 3. Rename temporary file to SNAPSHOT
    /// 4. Fsync the directory so the rename is durable
    fn save(&mut self, snapshot: &[u8]) -> StoreResult<()> {
        let temp_path = self.path.join(SNAPSHOT_TEMP);

        let mut file = File::create(&temp_path)?;
        file.write_all(snapshot)?;
        if self.sync_on_save {
            file.sync_all()?;
        }
        drop(file);

        fs::rename(&temp_path, self.snapshot_path())?;

        if self.sync_on_save {
            self.sync_directory()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> StoreResult<()> {
        self.sync_directory()
    }

    fn size(&self) -> StoreResult<u64> {
        match fs::metadata(self.snapshot_path()) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_directory() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let backend = FileBackend::open(&data_dir, true).unwrap();
        assert!(data_dir.is_dir());
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn open_missing_without_create_fails() {
        let dir = tempdir().unwrap();
        let result = FileBackend::open(&dir.path().join("missing"), false);
        assert!(matches!(result, Err(StoreError::InvalidOperation { .. })));
    }

    #[test]
    fn second_open_is_locked() {
        let dir = tempdir().unwrap();
        let _first = FileBackend::open(dir.path(), true).unwrap();
        let second = FileBackend::open(dir.path(), true);
        assert!(matches!(second, Err(StoreError::Locked)));
    }

    #[test]
    fn lock_released_on_drop() {
        let dir = tempdir().unwrap();
        drop(FileBackend::open(dir.path(), true).unwrap());
        assert!(FileBackend::open(dir.path(), true).is_ok());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempdir().unwrap();
        {
            let mut backend = FileBackend::open(dir.path(), true).unwrap();
            backend.save(b"first").unwrap();
            backend.save(b"second").unwrap();
            backend.flush().unwrap();
        }

        let backend = FileBackend::open(dir.path(), false).unwrap();
        assert_eq!(backend.load().unwrap(), Some(b"second".to_vec()));
        assert!(!dir.path().join(SNAPSHOT_TEMP).exists());
    }

    #[test]
    fn save_without_sync() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path(), true)
            .unwrap()
            .sync_on_save(false);
        backend.save(b"fast").unwrap();
        assert_eq!(backend.load().unwrap(), Some(b"fast".to_vec()));
    }
}
