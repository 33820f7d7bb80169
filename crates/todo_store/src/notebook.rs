//! Referential integrity between pages and items.
//!
//! A page's `items` list must always equal the set of items whose `page`
//! field points back at it. Every operation here that creates or destroys
//! an item runs inside a single store write transaction, so the item record
//! and the page's membership list commit or roll back together.

use crate::error::{StoreError, StoreResult};
use crate::id::EntityId;
use crate::model::{Item, ItemData, ItemFilter, Page};
use crate::store::Store;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Page and item operations that preserve referential integrity.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use todo_store::{ItemData, Notebook, Store};
///
/// let notebook = Notebook::new(Arc::new(Store::open_in_memory().unwrap()));
/// let page = notebook.create_page().unwrap();
/// let item = notebook
///     .add_item_to_page(page.id, ItemData::new("Buy milk", false))
///     .unwrap();
///
/// assert_eq!(notebook.get_page(page.id).unwrap().items, vec![item.id]);
/// notebook.delete_page(page.id).unwrap();
/// assert!(notebook.store().get_item(item.id).unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Notebook {
    store: Arc<Store>,
}

/// Returns the item if it is reachable through `page_id`.
///
/// An item is reachable only if the page exists, the item exists, the item
/// points back at the page and the page lists it.
fn reachable(
    page_id: EntityId,
    item_id: EntityId,
    page: Option<&Page>,
    item: Option<&Item>,
) -> StoreResult<Item> {
    let page = page.ok_or(StoreError::page_not_found(page_id))?;
    match item {
        Some(item) if item.page == page_id && page.contains(item_id) => Ok(item.clone()),
        _ => Err(StoreError::item_not_found(item_id)),
    }
}

impl Notebook {
    /// Creates a notebook over `store`.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    // ---- pages ----

    /// Creates an empty page.
    pub fn create_page(&self) -> StoreResult<Page> {
        let page = self.store.create_page()?;
        tracing::debug!(page = %page.id, "page created");
        Ok(page)
    }

    /// Gets a page, failing with `NotFound` if it doesn't exist.
    pub fn get_page(&self, id: EntityId) -> StoreResult<Page> {
        self.store
            .get_page(id)?
            .ok_or(StoreError::page_not_found(id))
    }

    /// Returns all pages in creation order.
    pub fn list_pages(&self) -> StoreResult<Vec<Page>> {
        self.store.list_pages()
    }

    /// Deletes a page together with every item it owns.
    ///
    /// Items are found both through the page's membership list and through
    /// their back-reference, so no orphan survives even if the two ever
    /// disagreed. Returns the page as it was before deletion.
    pub fn delete_page(&self, id: EntityId) -> StoreResult<Page> {
        let (page, removed) = self.store.write_transaction(|txn| {
            let page = txn
                .get_page(id)
                .cloned()
                .ok_or(StoreError::page_not_found(id))?;

            let filter = ItemFilter::all().in_page(id);
            let mut doomed: Vec<EntityId> = page.items.clone();
            doomed.extend(txn.items(&filter).map(|item| item.id));

            let mut seen = HashSet::new();
            let mut removed = 0usize;
            for item_id in doomed {
                if !seen.insert(item_id) {
                    continue;
                }
                // Only delete items that really belong here; a foreign id in
                // the membership list must not take another page's item down.
                let owned = txn.get_item(item_id).is_some_and(|item| item.page == id);
                if owned {
                    txn.delete_item(item_id)?;
                    removed += 1;
                }
            }

            txn.delete_page(id)?;
            Ok((page, removed))
        })?;

        tracing::debug!(page = %id, items = removed, "page deleted");
        Ok(page)
    }

    // ---- items ----

    /// Creates an item in a page and appends it to the page's list.
    ///
    /// Fails with `NotFound(Page)` without creating anything if the page
    /// doesn't exist.
    pub fn add_item_to_page(&self, page_id: EntityId, data: ItemData) -> StoreResult<Item> {
        let item = self.store.write_transaction(|txn| {
            if txn.get_page(page_id).is_none() {
                return Err(StoreError::page_not_found(page_id));
            }
            let item = txn.create_item(page_id, data);
            txn.append_page_item(page_id, item.id)?;
            Ok(item)
        })?;

        tracing::debug!(page = %page_id, item = %item.id, "item added");
        Ok(item)
    }

    /// Gets an item through its page.
    pub fn get_item_in_page(&self, page_id: EntityId, item_id: EntityId) -> StoreResult<Item> {
        self.store.read(|view| {
            reachable(
                page_id,
                item_id,
                view.get_page(page_id),
                view.get_item(item_id),
            )
        })?
    }

    /// Returns a page's items in membership-list order.
    pub fn list_items_in_page(&self, page_id: EntityId) -> StoreResult<Vec<Item>> {
        self.store.read(|view| {
            let page = view
                .get_page(page_id)
                .ok_or(StoreError::page_not_found(page_id))?;
            Ok(page
                .items
                .iter()
                .filter_map(|id| view.get_item(*id))
                .filter(|item| item.page == page_id)
                .cloned()
                .collect())
        })?
    }

    /// Replaces an item's `text` and `done`, keeping its identifier.
    pub fn update_item_in_page(
        &self,
        page_id: EntityId,
        item_id: EntityId,
        data: ItemData,
    ) -> StoreResult<Item> {
        let item = self.store.write_transaction(|txn| {
            reachable(
                page_id,
                item_id,
                txn.get_page(page_id),
                txn.get_item(item_id),
            )?;
            txn.update_item(item_id, data)
        })?;

        tracing::debug!(page = %page_id, item = %item_id, "item updated");
        Ok(item)
    }

    /// Unlinks an item from its page and deletes it.
    ///
    /// The item must belong to the page. Unlinking is idempotent: an item
    /// that points at the page but is missing from its list is still
    /// deleted. Returns the item as it was before deletion.
    pub fn remove_item_from_page(&self, page_id: EntityId, item_id: EntityId) -> StoreResult<Item> {
        let item = self.store.write_transaction(|txn| {
            if txn.get_page(page_id).is_none() {
                return Err(StoreError::page_not_found(page_id));
            }
            match txn.get_item(item_id) {
                Some(item) if item.page == page_id => {}
                _ => return Err(StoreError::item_not_found(item_id)),
            }
            txn.remove_page_item(page_id, item_id)?;
            txn.delete_item(item_id)
        })?;

        tracing::debug!(page = %page_id, item = %item_id, "item removed");
        Ok(item)
    }

    // ---- verification ----

    /// Checks every page and item for referential-integrity violations.
    pub fn check_integrity(&self) -> StoreResult<IntegrityReport> {
        self.store.read(|view| {
            let mut violations = Vec::new();
            let mut listed: HashSet<(EntityId, EntityId)> = HashSet::new();

            for page in view.pages() {
                let mut counts: HashMap<EntityId, usize> = HashMap::new();
                for item_id in &page.items {
                    *counts.entry(*item_id).or_default() += 1;
                }

                for item_id in &page.items {
                    // Report each distinct entry once.
                    if !listed.insert((page.id, *item_id)) {
                        continue;
                    }
                    if counts[item_id] > 1 {
                        violations.push(Violation::DuplicateMember {
                            page: page.id,
                            item: *item_id,
                        });
                    }
                    match view.get_item(*item_id) {
                        None => violations.push(Violation::DanglingMember {
                            page: page.id,
                            item: *item_id,
                        }),
                        Some(item) if item.page != page.id => {
                            violations.push(Violation::ForeignMember {
                                page: page.id,
                                item: *item_id,
                                owner: item.page,
                            })
                        }
                        Some(_) => {}
                    }
                }
            }

            for item in view.items() {
                if view.get_page(item.page).is_none() {
                    violations.push(Violation::OrphanedItem {
                        item: item.id,
                        page: item.page,
                    });
                } else if !listed.contains(&(item.page, item.id)) {
                    violations.push(Violation::UnlistedItem {
                        page: item.page,
                        item: item.id,
                    });
                }
            }

            IntegrityReport {
                pages: view.page_count(),
                items: view.item_count(),
                violations,
            }
        })
    }
}

/// A single referential-integrity violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A page lists an item that doesn't exist.
    DanglingMember {
        /// The listing page.
        page: EntityId,
        /// The missing item.
        item: EntityId,
    },
    /// A page lists an item that belongs to another page.
    ForeignMember {
        /// The listing page.
        page: EntityId,
        /// The listed item.
        item: EntityId,
        /// The page the item points at.
        owner: EntityId,
    },
    /// A page lists the same item more than once.
    DuplicateMember {
        /// The listing page.
        page: EntityId,
        /// The repeated item.
        item: EntityId,
    },
    /// An item points at a page that doesn't list it.
    UnlistedItem {
        /// The page the item points at.
        page: EntityId,
        /// The unlisted item.
        item: EntityId,
    },
    /// An item points at a page that doesn't exist.
    OrphanedItem {
        /// The orphaned item.
        item: EntityId,
        /// The missing page.
        page: EntityId,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DanglingMember { page, item } => {
                write!(f, "page {page} lists missing item {item}")
            }
            Violation::ForeignMember { page, item, owner } => {
                write!(f, "page {page} lists item {item} owned by page {owner}")
            }
            Violation::DuplicateMember { page, item } => {
                write!(f, "page {page} lists item {item} more than once")
            }
            Violation::UnlistedItem { page, item } => {
                write!(f, "item {item} is not listed by its page {page}")
            }
            Violation::OrphanedItem { item, page } => {
                write!(f, "item {item} belongs to missing page {page}")
            }
        }
    }
}

/// Result of [`Notebook::check_integrity`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    /// Number of pages checked.
    pub pages: usize,
    /// Number of items checked.
    pub items: usize,
    /// Every violation found.
    pub violations: Vec<Violation>,
}

impl IntegrityReport {
    /// Returns true if no violation was found.
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }
}
