//! The document store.

use crate::backend::{FileBackend, InMemoryBackend, StorageBackend};
use crate::codec::Snapshot;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::id::EntityId;
use crate::model::{Item, ItemData, ItemFilter, Page};
use crate::transaction::{ReadView, State, WriteTransaction};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};

/// Persistent store for pages and items.
///
/// All writes go through [`Store::write_transaction`], which admits a single
/// writer at a time and persists a snapshot before the write becomes
/// visible. Reads take a shared lock and never observe a half-applied
/// transaction.
///
/// The store's own single-shot writers are raw: they do not maintain page
/// membership. Use [`crate::Notebook`] for operations that keep pages and
/// items consistent.
///
/// # Example
///
/// ```rust
/// use todo_store::{ItemData, Store};
///
/// let store = Store::open_in_memory().unwrap();
/// let page = store.create_page().unwrap();
/// let item = store.write_transaction(|txn| {
///     let item = txn.create_item(page.id, ItemData::new("Buy milk", false));
///     txn.append_page_item(page.id, item.id)?;
///     Ok(item)
/// }).unwrap();
///
/// assert_eq!(store.get_page(page.id).unwrap().unwrap().items, vec![item.id]);
/// ```
pub struct Store {
    config: StoreConfig,
    state: RwLock<State>,
    backend: Mutex<Box<dyn StorageBackend>>,
    closed: AtomicBool,
}

impl Store {
    /// Opens a store as described by `config`.
    ///
    /// A configuration without a data directory opens an in-memory store.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let backend: Box<dyn StorageBackend> = match &config.data_dir {
            Some(path) => Box::new(
                FileBackend::open(path, config.create_if_missing)?
                    .sync_on_save(config.sync_on_commit),
            ),
            None => Box::new(InMemoryBackend::new()),
        };
        Self::with_backend(config, backend)
    }

    /// Opens an empty in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_backend(StoreConfig::in_memory(), Box::new(InMemoryBackend::new()))
    }

    /// Opens a store over an existing backend, loading its snapshot.
    pub fn with_backend(
        config: StoreConfig,
        backend: Box<dyn StorageBackend>,
    ) -> StoreResult<Self> {
        let state = match backend.load()? {
            Some(bytes) => State::from_snapshot(Snapshot::decode(&bytes)?),
            None => State::default(),
        };

        tracing::info!(
            data_dir = ?config.data_dir,
            pages = state.pages.len(),
            items = state.items.len(),
            "store opened"
        );

        Ok(Self {
            config,
            state: RwLock::new(state),
            backend: Mutex::new(backend),
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    // ---- reads ----

    /// Gets a page by ID. A missing page is `Ok(None)`.
    pub fn get_page(&self, id: EntityId) -> StoreResult<Option<Page>> {
        self.ensure_open()?;
        Ok(self.state.read().pages.get(id).cloned())
    }

    /// Gets an item by ID. A missing item is `Ok(None)`.
    pub fn get_item(&self, id: EntityId) -> StoreResult<Option<Item>> {
        self.ensure_open()?;
        Ok(self.state.read().items.get(id).cloned())
    }

    /// Returns all pages in insertion order.
    pub fn list_pages(&self) -> StoreResult<Vec<Page>> {
        self.ensure_open()?;
        Ok(self.state.read().pages.iter().cloned().collect())
    }

    /// Returns items matching `filter`, in insertion order.
    pub fn list_items(&self, filter: &ItemFilter) -> StoreResult<Vec<Item>> {
        self.ensure_open()?;
        Ok(self
            .state
            .read()
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    /// Returns the number of pages.
    pub fn page_count(&self) -> StoreResult<usize> {
        self.ensure_open()?;
        Ok(self.state.read().pages.len())
    }

    /// Returns the number of items.
    pub fn item_count(&self) -> StoreResult<usize> {
        self.ensure_open()?;
        Ok(self.state.read().items.len())
    }

    /// Runs `f` against a consistent view of the store.
    ///
    /// The view holds a shared lock, so `f` should not block.
    pub fn read<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&ReadView<'_>) -> T,
    {
        self.ensure_open()?;
        let state = self.state.read();
        Ok(f(&ReadView::new(&state)))
    }

    // ---- writes ----

    /// Executes a function within a write transaction.
    ///
    /// If the function returns `Ok` and the resulting snapshot is saved,
    /// the transaction is committed. If the function returns `Err` or the
    /// save fails, every change is rolled back and the error is returned.
    ///
    /// This ensures single-writer semantics: only one write transaction
    /// can be active at a time.
    pub fn write_transaction<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut WriteTransaction<'_>) -> StoreResult<T>,
    {
        self.ensure_open()?;
        let mut state = self.state.write();
        let mut txn = WriteTransaction::new(&mut state);

        let result = match f(&mut txn) {
            Ok(result) => result,
            Err(e) => {
                txn.rollback();
                return Err(e);
            }
        };

        if !txn.is_dirty() {
            return Ok(result);
        }

        if let Err(e) = self.persist(txn.state()) {
            tracing::error!(error = %e, "failed to persist snapshot, rolling back");
            txn.rollback();
            return Err(e);
        }

        Ok(result)
    }

    fn persist(&self, state: &State) -> StoreResult<()> {
        let bytes = state.to_snapshot().encode()?;
        self.backend.lock().save(&bytes)?;
        tracing::debug!(
            bytes = bytes.len(),
            pages = state.pages.len(),
            items = state.items.len(),
            "snapshot committed"
        );
        Ok(())
    }

    /// Creates an empty page.
    pub fn create_page(&self) -> StoreResult<Page> {
        self.write_transaction(|txn| Ok(txn.create_page()))
    }

    /// Creates an item owned by `page`, without linking it into the page.
    pub fn create_item(&self, page: EntityId, data: ItemData) -> StoreResult<Item> {
        self.write_transaction(|txn| Ok(txn.create_item(page, data)))
    }

    /// Overwrites an item's mutable fields.
    pub fn update_item(&self, id: EntityId, data: ItemData) -> StoreResult<Item> {
        self.write_transaction(|txn| txn.update_item(id, data))
    }

    /// Deletes an item record, returning its last value.
    pub fn delete_item(&self, id: EntityId) -> StoreResult<Item> {
        self.write_transaction(|txn| txn.delete_item(id))
    }

    /// Deletes a page record, returning its last value.
    pub fn delete_page(&self, id: EntityId) -> StoreResult<Page> {
        self.write_transaction(|txn| txn.delete_page(id))
    }

    // ---- lifecycle ----

    /// Returns the size of the last saved snapshot in bytes.
    pub fn snapshot_size(&self) -> StoreResult<u64> {
        self.ensure_open()?;
        self.backend.lock().size()
    }

    /// Persists the current state and closes the store.
    ///
    /// Every later operation returns [`StoreError::Closed`].
    pub fn close(&self) -> StoreResult<()> {
        // Hold the write lock so no transaction commits after the final save.
        let state = self.state.write();
        if self.closed.load(Ordering::Acquire) {
            return Ok(());
        }
        self.persist(&state)?;
        self.backend.lock().flush()?;
        self.closed.store(true, Ordering::Release);
        tracing::info!("store closed");
        Ok(())
    }

    /// Returns true if the store has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Store")
            .field("data_dir", &self.config.data_dir)
            .field("pages", &state.pages.len())
            .field("items", &state.items.len())
            .finish_non_exhaustive()
    }
}
