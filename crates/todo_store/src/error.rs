//! Error types for the document store.

use crate::id::EntityId;
use crate::model::EntityKind;
use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found, or not reachable through the page it was addressed by.
    #[error("{kind} {id} not found!")]
    NotFound {
        /// Kind of the missing entity.
        kind: EntityKind,
        /// The identifier that was looked up.
        id: EntityId,
    },

    /// I/O error from a storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Snapshot could not be encoded or decoded.
    #[error("codec error: {message}")]
    Codec {
        /// Description of the codec failure.
        message: String,
    },

    /// Persisted snapshot is corrupted or has an unsupported format.
    #[error("snapshot corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },

    /// Data directory is held by another process.
    #[error("store locked: another process has exclusive access")]
    Locked,

    /// Store has been closed.
    #[error("store is closed")]
    Closed,

    /// Operation not permitted in the current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Why the operation was rejected.
        message: String,
    },
}

impl StoreError {
    /// Creates a not-found error for a page.
    pub fn page_not_found(id: EntityId) -> Self {
        Self::NotFound {
            kind: EntityKind::Page,
            id,
        }
    }

    /// Creates a not-found error for an item.
    pub fn item_not_found(id: EntityId) -> Self {
        Self::NotFound {
            kind: EntityKind::Item,
            id,
        }
    }

    /// Creates a codec error.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if this error means the addressed entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_kind_and_id() {
        let id: EntityId = "0123456789abcdef01234567".parse().unwrap();
        assert_eq!(
            StoreError::page_not_found(id).to_string(),
            "Page 0123456789abcdef01234567 not found!"
        );
        assert_eq!(
            StoreError::item_not_found(id).to_string(),
            "Item 0123456789abcdef01234567 not found!"
        );
    }

    #[test]
    fn classification() {
        let id = EntityId::new();
        assert!(StoreError::item_not_found(id).is_not_found());
        assert!(!StoreError::Closed.is_not_found());
        assert!(!StoreError::corrupted("bad magic").is_not_found());
    }
}
