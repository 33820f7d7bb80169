//! # Todo Store
//!
//! Embedded document store for the to-do pages service.
//!
//! This crate provides:
//! - Page and item documents with 24-character hex identifiers
//! - Insertion-ordered collections under a single-writer store
//! - Undo-logged write transactions persisted as CBOR snapshots
//! - The [`Notebook`] layer that keeps pages and items referentially intact
//!
//! ## Storage Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - Atomic snapshot file guarded by a directory lock
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use todo_store::{ItemData, Notebook, Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::in_memory()).unwrap();
//! let notebook = Notebook::new(Arc::new(store));
//!
//! let page = notebook.create_page().unwrap();
//! let item = notebook
//!     .add_item_to_page(page.id, ItemData::new("Water plants", false))
//!     .unwrap();
//!
//! let fetched = notebook.get_item_in_page(page.id, item.id).unwrap();
//! assert_eq!(fetched.text, "Water plants");
//! assert!(notebook.check_integrity().unwrap().is_consistent());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod backend;
mod codec;
mod collection;
mod config;
mod error;
mod id;
mod model;
mod notebook;
mod store;
mod transaction;

pub use backend::{FileBackend, InMemoryBackend, StorageBackend};
pub use codec::{Snapshot, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
pub use collection::{Collection, SequenceNumber};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use id::{EntityId, ParseIdError, ID_BYTES, ID_LEN};
pub use model::{Document, EntityKind, Item, ItemData, ItemFilter, Page};
pub use notebook::{IntegrityReport, Notebook, Violation};
pub use store::Store;
pub use transaction::{ReadView, WriteTransaction};
