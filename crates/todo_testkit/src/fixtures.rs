//! Test fixtures and notebook helpers.
//!
//! Provides convenience functions for setting up test notebooks
//! and common test scenarios.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use todo_store::{Notebook, Store, StoreConfig};

/// A test notebook with automatic cleanup.
pub struct TestNotebook {
    /// The notebook instance.
    pub notebook: Notebook,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestNotebook {
    /// Creates a new in-memory test notebook.
    pub fn memory() -> Self {
        let store = Store::open_in_memory().expect("Failed to open in-memory store");
        Self {
            notebook: Notebook::new(Arc::new(store)),
            _temp_dir: None,
        }
    }

    /// Creates a new file-based test notebook in a temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = open_file_store(temp_dir.path());
        Self {
            notebook: Notebook::new(Arc::new(store)),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the data directory if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().to_path_buf())
    }

    /// Closes the store and opens it again from its data directory.
    ///
    /// An in-memory notebook is returned unchanged.
    pub fn reopen(mut self) -> Self {
        let Some(temp_dir) = self._temp_dir.take() else {
            return self;
        };
        self.notebook.store().close().expect("Failed to close store");
        drop(self.notebook);

        let store = open_file_store(temp_dir.path());
        Self {
            notebook: Notebook::new(Arc::new(store)),
            _temp_dir: Some(temp_dir),
        }
    }
}

fn open_file_store(path: &Path) -> Store {
    Store::open(StoreConfig::at(path).sync_on_commit(false)).expect("Failed to open file store")
}

impl std::ops::Deref for TestNotebook {
    type Target = Notebook;

    fn deref(&self) -> &Self::Target {
        &self.notebook
    }
}

/// Runs a test with a temporary in-memory notebook.
///
/// # Example
///
/// ```rust
/// use todo_testkit::with_notebook;
///
/// with_notebook(|nb| {
///     let page = nb.create_page().unwrap();
///     assert!(page.items.is_empty());
/// });
/// ```
pub fn with_notebook<F, R>(f: F) -> R
where
    F: FnOnce(&Notebook) -> R,
{
    let test = TestNotebook::memory();
    f(&test.notebook)
}

/// Runs a test with a temporary file-based notebook.
pub fn with_file_notebook<F, R>(f: F) -> R
where
    F: FnOnce(&Notebook, &Path) -> R,
{
    let test = TestNotebook::file();
    let path = test.path().expect("File notebook should have a path");
    f(&test.notebook, &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use todo_store::{Item, ItemData, Page};

    /// A page together with the items created in it, in creation order.
    pub type SeededPage = (Page, Vec<Item>);

    /// Creates a notebook with `pages` pages of `items_per_page` items each.
    ///
    /// Item texts are `"page {p} item {i}"`; every third item is done.
    pub fn seeded_notebook(pages: usize, items_per_page: usize) -> (TestNotebook, Vec<SeededPage>) {
        let test = TestNotebook::memory();
        let seeded = seed(&test.notebook, pages, items_per_page);
        (test, seeded)
    }

    /// Fills an existing notebook the same way as [`seeded_notebook`].
    pub fn seed(notebook: &Notebook, pages: usize, items_per_page: usize) -> Vec<SeededPage> {
        (0..pages)
            .map(|p| {
                let page = notebook.create_page().expect("Failed to create page");
                let items = (0..items_per_page)
                    .map(|i| {
                        let data = ItemData::new(format!("page {p} item {i}"), i % 3 == 0);
                        notebook
                            .add_item_to_page(page.id, data)
                            .expect("Failed to add item")
                    })
                    .collect();
                let page = notebook.get_page(page.id).expect("Failed to reload page");
                (page, items)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notebook() {
        let test = TestNotebook::memory();
        assert!(test.path().is_none());
        assert!(test.list_pages().unwrap().is_empty());
    }

    #[test]
    fn test_file_notebook_survives_reopen() {
        let test = TestNotebook::file();
        let page = test.create_page().unwrap();

        let test = test.reopen();
        assert_eq!(test.get_page(page.id).unwrap(), page);
    }

    #[test]
    fn test_seeded_scenario() {
        let (test, seeded) = scenarios::seeded_notebook(3, 4);
        assert_eq!(seeded.len(), 3);
        for (page, items) in &seeded {
            let ids: Vec<_> = items.iter().map(|i| i.id).collect();
            assert_eq!(page.items, ids);
        }
        assert_eq!(test.store().item_count().unwrap(), 12);
        assert!(test.check_integrity().unwrap().is_consistent());
    }
}
