//! Store configuration.

use std::path::{Path, PathBuf};

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Data directory. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,

    /// Whether to create the data directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to fsync the snapshot on every commit (safer but slower).
    pub sync_on_commit: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            create_if_missing: true,
            sync_on_commit: true,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration for an in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates a configuration for a store in `path`.
    #[must_use]
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            data_dir: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Sets whether to create the data directory if missing.
    #[must_use]
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to fsync on every commit.
    #[must_use]
    pub fn sync_on_commit(mut self, value: bool) -> Self {
        self.sync_on_commit = value;
        self
    }

    /// Returns true if the store keeps no files.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.data_dir.is_none()
    }
}
