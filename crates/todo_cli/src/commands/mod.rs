//! CLI command implementations.

pub mod inspect;
pub mod serve;
pub mod verify;

use std::path::{Path, PathBuf};
use thiserror::Error;
use todo_store::{Store, StoreConfig, StoreError};

/// Errors reported by CLI commands.
#[derive(Error, Debug)]
pub enum CliError {
    /// A command that needs a data directory was run without one.
    #[error("--data-dir is required for {0}")]
    MissingDataDir(&'static str),

    /// No store exists at the given path.
    #[error("no store found at {0:?}")]
    NoStore(PathBuf),

    /// Integrity check found problems.
    #[error("verification failed with {0} violation(s)")]
    VerificationFailed(usize),

    /// Store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Server error.
    #[error(transparent)]
    Server(#[from] todo_server::ServerError),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Opens an existing store for maintenance, never creating one.
pub fn open_existing(path: &Path) -> Result<Store, CliError> {
    if !path.is_dir() {
        return Err(CliError::NoStore(path.to_path_buf()));
    }
    let config = StoreConfig::at(path).create_if_missing(false);
    Ok(Store::open(config)?)
}
