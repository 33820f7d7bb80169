//! Storage backends for store snapshots.

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::InMemoryBackend;

use crate::error::StoreResult;

/// A byte store holding the latest snapshot of the store.
///
/// Backends are **opaque**: they never interpret the snapshot. The store
/// owns the format (see [`crate::codec`]).
///
/// # Invariants
///
/// - `load` returns exactly the bytes of the last successful `save`
/// - A failed `save` leaves the previously saved snapshot intact
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`InMemoryBackend`] - For tests and ephemeral stores
/// - [`FileBackend`] - For persistent storage in a data directory
pub trait StorageBackend: Send + Sync {
    /// Loads the last saved snapshot.
    ///
    /// Returns `None` if nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read.
    fn load(&self) -> StoreResult<Option<Vec<u8>>>;

    /// Replaces the saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written. The previous
    /// snapshot must remain loadable in that case.
    fn save(&mut self, snapshot: &[u8]) -> StoreResult<()>;

    /// Flushes pending writes to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn flush(&mut self) -> StoreResult<()>;

    /// Returns the size of the saved snapshot in bytes, zero if none.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StoreResult<u64>;
}
