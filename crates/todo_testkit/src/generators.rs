//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random notebook data and operation
//! sequences, plus [`OpRunner`], which replays operations against a
//! [`Notebook`] and a plain in-memory model side by side.

use proptest::prelude::*;
use proptest::sample::Index;
use todo_store::{EntityId, ItemData, Notebook, StoreError, StoreResult, ID_BYTES};

/// Strategy for generating valid entity IDs.
pub fn entity_id_strategy() -> impl Strategy<Value = EntityId> {
    prop::array::uniform12(any::<u8>()).prop_map(EntityId::from_bytes)
}

/// Strategy for generating item text, including characters that get escaped.
pub fn item_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 &<>\"'/]{1,40}")
        .expect("Invalid regex")
        .prop_filter("Item text must not be blank", |s| !s.trim().is_empty())
}

/// Strategy for generating item data.
pub fn item_data_strategy() -> impl Strategy<Value = ItemData> {
    (item_text_strategy(), any::<bool>()).prop_map(|(text, done)| ItemData::new(text, done))
}

/// A notebook operation addressed by position rather than by identifier.
///
/// Indices select among the pages and items that exist when the operation
/// runs, so generated sequences mostly hit live entities.
#[derive(Debug, Clone)]
pub enum NotebookOp {
    /// Create an empty page.
    CreatePage,
    /// Delete a page and its items.
    DeletePage {
        /// Selects the page.
        page: Index,
    },
    /// Add an item to a page.
    AddItem {
        /// Selects the page.
        page: Index,
        /// Item contents.
        data: ItemData,
    },
    /// Replace an item's contents.
    UpdateItem {
        /// Selects the page.
        page: Index,
        /// Selects the item within the page.
        item: Index,
        /// New contents.
        data: ItemData,
    },
    /// Remove an item from its page.
    RemoveItem {
        /// Selects the page.
        page: Index,
        /// Selects the item within the page.
        item: Index,
    },
    /// Address an item through a page it does not belong to.
    CrossPageRemove {
        /// Selects the page used in the request.
        page: Index,
        /// Selects the item from all items.
        item: Index,
    },
}

/// Strategy for generating notebook operations.
pub fn notebook_op_strategy() -> impl Strategy<Value = NotebookOp> {
    prop_oneof![
        2 => Just(NotebookOp::CreatePage),
        1 => any::<Index>().prop_map(|page| NotebookOp::DeletePage { page }),
        4 => (any::<Index>(), item_data_strategy())
            .prop_map(|(page, data)| NotebookOp::AddItem { page, data }),
        2 => (any::<Index>(), any::<Index>(), item_data_strategy())
            .prop_map(|(page, item, data)| NotebookOp::UpdateItem { page, item, data }),
        2 => (any::<Index>(), any::<Index>())
            .prop_map(|(page, item)| NotebookOp::RemoveItem { page, item }),
        1 => (any::<Index>(), any::<Index>())
            .prop_map(|(page, item)| NotebookOp::CrossPageRemove { page, item }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn notebook_op_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<NotebookOp>> {
    prop::collection::vec(notebook_op_strategy(), min_ops..max_ops)
}

/// Expected state of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPage {
    /// Page identifier.
    pub id: EntityId,
    /// Items in membership order, with their expected contents.
    pub items: Vec<(EntityId, ItemData)>,
}

/// Applies operations to a notebook and to a model of what it should hold.
#[derive(Debug, Default)]
pub struct OpRunner {
    pages: Vec<ModelPage>,
}

impl OpRunner {
    /// Creates a runner with an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the model pages in creation order.
    pub fn pages(&self) -> &[ModelPage] {
        &self.pages
    }

    /// Returns the number of items in the model.
    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|p| p.items.len()).sum()
    }

    /// Applies one operation to `notebook` and to the model.
    ///
    /// Operations that select from an empty set are skipped. Returns an
    /// error only if the notebook disagrees with the model about whether
    /// an operation should succeed.
    pub fn apply(&mut self, notebook: &Notebook, op: &NotebookOp) -> StoreResult<()> {
        match op {
            NotebookOp::CreatePage => {
                let page = notebook.create_page()?;
                self.pages.push(ModelPage {
                    id: page.id,
                    items: Vec::new(),
                });
            }
            NotebookOp::DeletePage { page } => {
                if self.pages.is_empty() {
                    return Ok(());
                }
                let removed = self.pages.remove(page.index(self.pages.len()));
                notebook.delete_page(removed.id)?;
            }
            NotebookOp::AddItem { page, data } => {
                if self.pages.is_empty() {
                    return Ok(());
                }
                let idx = page.index(self.pages.len());
                let model = &mut self.pages[idx];
                let item = notebook.add_item_to_page(model.id, data.clone())?;
                model.items.push((item.id, data.clone()));
            }
            NotebookOp::UpdateItem { page, item, data } => {
                let Some((p, i)) = self.select(page, item) else {
                    return Ok(());
                };
                let model = &mut self.pages[p];
                notebook.update_item_in_page(model.id, model.items[i].0, data.clone())?;
                model.items[i].1 = data.clone();
            }
            NotebookOp::RemoveItem { page, item } => {
                let Some((p, i)) = self.select(page, item) else {
                    return Ok(());
                };
                let model = &mut self.pages[p];
                let (item_id, _) = model.items.remove(i);
                notebook.remove_item_from_page(model.id, item_id)?;
            }
            NotebookOp::CrossPageRemove { page, item } => {
                let all: Vec<(usize, EntityId)> = self
                    .pages
                    .iter()
                    .enumerate()
                    .flat_map(|(p, model)| model.items.iter().map(move |(id, _)| (p, *id)))
                    .collect();
                if all.is_empty() || self.pages.len() < 2 {
                    return Ok(());
                }
                let (owner, item_id) = all[item.index(all.len())];
                let mut other = page.index(self.pages.len() - 1);
                if other >= owner {
                    other += 1;
                }
                match notebook.remove_item_from_page(self.pages[other].id, item_id) {
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                    Ok(_) => {
                        return Err(StoreError::invalid_operation(
                            "item removed through a foreign page",
                        ))
                    }
                }
            }
        }
        Ok(())
    }

    fn select(&self, page: &Index, item: &Index) -> Option<(usize, usize)> {
        if self.pages.is_empty() {
            return None;
        }
        let p = page.index(self.pages.len());
        let items = &self.pages[p].items;
        if items.is_empty() {
            return None;
        }
        Some((p, item.index(items.len())))
    }
}

/// Returns the all-zero identifier, for addressing entities that don't exist.
pub fn nil_id() -> EntityId {
    EntityId::from_bytes([0; ID_BYTES])
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn entity_id_renders_canonically(id in entity_id_strategy()) {
            let text = id.to_string();
            prop_assert_eq!(text.len(), todo_store::ID_LEN);
            prop_assert_eq!(text.parse::<EntityId>().unwrap(), id);
        }

        #[test]
        fn item_text_is_not_blank(text in item_text_strategy()) {
            prop_assert!(!text.trim().is_empty());
        }
    }

    #[test]
    fn nil_id_is_all_zeros() {
        assert_eq!(nil_id().to_string(), "0".repeat(todo_store::ID_LEN));
    }
}
