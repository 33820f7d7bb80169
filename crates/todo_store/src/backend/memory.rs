//! In-memory storage backend.

use super::StorageBackend;
use crate::error::StoreResult;
use parking_lot::RwLock;
use std::sync::Arc;

/// An in-memory storage backend.
///
/// Suitable for unit tests, integration tests and servers that don't
/// need persistence. Clones share the same underlying buffer, so a test
/// can keep a handle and reopen a store from what was saved.
///
/// # Example
///
/// ```rust
/// use todo_store::{InMemoryBackend, StorageBackend};
///
/// let mut backend = InMemoryBackend::new();
/// assert!(backend.load().unwrap().is_none());
/// backend.save(b"snapshot").unwrap();
/// assert_eq!(backend.load().unwrap().as_deref(), Some(&b"snapshot"[..]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    snapshot: Arc<RwLock<Option<Vec<u8>>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding pre-existing snapshot bytes.
    ///
    /// Useful for testing recovery of corrupted snapshots.
    #[must_use]
    pub fn with_snapshot(data: Vec<u8>) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Some(data))),
        }
    }
}

impl StorageBackend for InMemoryBackend {
    fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.snapshot.read().clone())
    }

    fn save(&mut self, snapshot: &[u8]) -> StoreResult<()> {
        *self.snapshot.write() = Some(snapshot.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> StoreResult<()> {
        Ok(())
    }

    fn size(&self) -> StoreResult<u64> {
        Ok(self.snapshot.read().as_ref().map_or(0, |s| s.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.load().unwrap().is_none());
        assert_eq!(backend.size().unwrap(), 0);
    }

    #[test]
    fn save_replaces_snapshot() {
        let mut backend = InMemoryBackend::new();
        backend.save(b"one").unwrap();
        backend.save(b"two!").unwrap();
        assert_eq!(backend.load().unwrap(), Some(b"two!".to_vec()));
        assert_eq!(backend.size().unwrap(), 4);
    }

    #[test]
    fn clones_share_data() {
        let mut backend = InMemoryBackend::new();
        let observer = backend.clone();
        backend.save(b"shared").unwrap();
        assert_eq!(observer.load().unwrap(), Some(b"shared".to_vec()));
    }
}
