//! Write transactions.
//!
//! A [`WriteTransaction`] mutates the store state in place and records an
//! undo entry for every change. The store either commits the transaction
//! (persisting a snapshot) or replays the undo log in reverse, so a failed
//! transaction leaves no trace.

use crate::codec::Snapshot;
use crate::collection::{Collection, SequenceNumber};
use crate::error::{StoreError, StoreResult};
use crate::id::EntityId;
use crate::model::{Item, ItemData, ItemFilter, Page};

/// In-memory state of the store.
#[derive(Debug, Clone, Default)]
pub(crate) struct State {
    pub(crate) pages: Collection<Page>,
    pub(crate) items: Collection<Item>,
    pub(crate) next_sequence: SequenceNumber,
}

impl State {
    pub(crate) fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut state = Self::default();
        let mut seq: SequenceNumber = 0;
        for page in snapshot.pages {
            state.pages.insert(seq, page);
            seq += 1;
        }
        for item in snapshot.items {
            state.items.insert(seq, item);
            seq += 1;
        }
        state.next_sequence = snapshot.next_sequence.max(seq);
        state
    }

    pub(crate) fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            next_sequence: self.next_sequence,
            pages: self.pages.iter().cloned().collect(),
            items: self.items.iter().cloned().collect(),
        }
    }
}

/// A consistent read-only view of the store.
pub struct ReadView<'a> {
    state: &'a State,
}

impl<'a> ReadView<'a> {
    pub(crate) fn new(state: &'a State) -> Self {
        Self { state }
    }

    /// Gets a page by ID.
    pub fn get_page(&self, id: EntityId) -> Option<&'a Page> {
        self.state.pages.get(id)
    }

    /// Gets an item by ID.
    pub fn get_item(&self, id: EntityId) -> Option<&'a Item> {
        self.state.items.get(id)
    }

    /// Iterates over pages in insertion order.
    pub fn pages(&self) -> impl Iterator<Item = &'a Page> + 'a {
        self.state.pages.iter()
    }

    /// Iterates over items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &'a Item> + 'a {
        self.state.items.iter()
    }

    /// Returns the number of pages.
    pub fn page_count(&self) -> usize {
        self.state.pages.len()
    }

    /// Returns the number of items.
    pub fn item_count(&self) -> usize {
        self.state.items.len()
    }
}

/// A change that can be reverted.
#[derive(Debug)]
enum Undo {
    Page {
        id: EntityId,
        previous: Option<(SequenceNumber, Page)>,
    },
    Item {
        id: EntityId,
        previous: Option<(SequenceNumber, Item)>,
    },
    Sequence(SequenceNumber),
}

/// An exclusive write transaction.
///
/// Reads through the transaction observe its own uncommitted writes.
/// Only one write transaction can be active at a time.
pub struct WriteTransaction<'a> {
    state: &'a mut State,
    undo: Vec<Undo>,
}

impl<'a> WriteTransaction<'a> {
    pub(crate) fn new(state: &'a mut State) -> Self {
        Self {
            state,
            undo: Vec::new(),
        }
    }

    /// Returns true if the transaction has changed anything.
    pub fn is_dirty(&self) -> bool {
        !self.undo.is_empty()
    }

    pub(crate) fn state(&self) -> &State {
        self.state
    }

    /// Reverts every change made by this transaction.
    pub(crate) fn rollback(mut self) {
        while let Some(entry) = self.undo.pop() {
            match entry {
                Undo::Page { id, previous } => {
                    self.state.pages.remove(id);
                    if let Some((seq, page)) = previous {
                        self.state.pages.insert(seq, page);
                    }
                }
                Undo::Item { id, previous } => {
                    self.state.items.remove(id);
                    if let Some((seq, item)) = previous {
                        self.state.items.insert(seq, item);
                    }
                }
                Undo::Sequence(seq) => self.state.next_sequence = seq,
            }
        }
    }

    fn next_sequence(&mut self) -> SequenceNumber {
        let seq = self.state.next_sequence;
        self.undo.push(Undo::Sequence(seq));
        self.state.next_sequence = seq + 1;
        seq
    }

    fn page_mut(&mut self, id: EntityId) -> StoreResult<&mut Page> {
        let seq = self
            .state
            .pages
            .sequence_of(id)
            .ok_or(StoreError::page_not_found(id))?;
        let previous = self.state.pages.get(id).cloned().map(|page| (seq, page));
        self.undo.push(Undo::Page { id, previous });
        self.state
            .pages
            .get_mut(id)
            .ok_or(StoreError::page_not_found(id))
    }

    fn item_mut(&mut self, id: EntityId) -> StoreResult<&mut Item> {
        let seq = self
            .state
            .items
            .sequence_of(id)
            .ok_or(StoreError::item_not_found(id))?;
        let previous = self.state.items.get(id).cloned().map(|item| (seq, item));
        self.undo.push(Undo::Item { id, previous });
        self.state
            .items
            .get_mut(id)
            .ok_or(StoreError::item_not_found(id))
    }

    // ---- reads ----

    /// Gets a page by ID.
    pub fn get_page(&self, id: EntityId) -> Option<&Page> {
        self.state.pages.get(id)
    }

    /// Gets an item by ID.
    pub fn get_item(&self, id: EntityId) -> Option<&Item> {
        self.state.items.get(id)
    }

    /// Iterates over pages in insertion order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> + '_ {
        self.state.pages.iter()
    }

    /// Iterates over items matching `filter`, in insertion order.
    pub fn items<'f>(&'f self, filter: &'f ItemFilter) -> impl Iterator<Item = &'f Item> + 'f {
        self.state.items.iter().filter(move |item| filter.matches(item))
    }

    // ---- pages ----

    /// Creates an empty page.
    pub fn create_page(&mut self) -> Page {
        let page = Page::new();
        let seq = self.next_sequence();
        self.undo.push(Undo::Page {
            id: page.id,
            previous: None,
        });
        self.state.pages.insert(seq, page.clone());
        page
    }

    /// Appends `item` to the page's membership list.
    pub fn append_page_item(&mut self, page: EntityId, item: EntityId) -> StoreResult<()> {
        self.page_mut(page)?.items.push(item);
        Ok(())
    }

    /// Removes every occurrence of `item` from the page's membership list.
    ///
    /// Returns how many entries were removed; zero is not an error.
    pub fn remove_page_item(&mut self, page: EntityId, item: EntityId) -> StoreResult<usize> {
        let removed = self.page_mut(page)?.unlink(item);
        if removed == 0 {
            // Nothing changed, drop the undo entry pushed by page_mut.
            self.undo.pop();
        }
        Ok(removed)
    }

    /// Deletes a page record and returns it.
    ///
    /// This does not touch the page's items.
    pub fn delete_page(&mut self, id: EntityId) -> StoreResult<Page> {
        let (seq, page) = self
            .state
            .pages
            .remove(id)
            .ok_or(StoreError::page_not_found(id))?;
        self.undo.push(Undo::Page {
            id,
            previous: Some((seq, page.clone())),
        });
        Ok(page)
    }

    // ---- items ----

    /// Creates an item owned by `page`.
    ///
    /// This does not update the page's membership list.
    pub fn create_item(&mut self, page: EntityId, data: ItemData) -> Item {
        let item = Item::new(page, data);
        let seq = self.next_sequence();
        self.undo.push(Undo::Item {
            id: item.id,
            previous: None,
        });
        self.state.items.insert(seq, item.clone());
        item
    }

    /// Overwrites an item's mutable fields.
    pub fn update_item(&mut self, id: EntityId, data: ItemData) -> StoreResult<Item> {
        let item = self.item_mut(id)?;
        item.apply(data);
        Ok(item.clone())
    }

    /// Deletes an item record and returns it.
    ///
    /// This does not update the owning page's membership list.
    pub fn delete_item(&mut self, id: EntityId) -> StoreResult<Item> {
        let (seq, item) = self
            .state
            .items
            .remove(id)
            .ok_or(StoreError::item_not_found(id))?;
        self.undo.push(Undo::Item {
            id,
            previous: Some((seq, item.clone())),
        });
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_restores_everything() {
        let mut state = State::default();
        let (page, kept) = {
            let mut txn = WriteTransaction::new(&mut state);
            let page = txn.create_page();
            let kept = txn.create_item(page.id, ItemData::new("kept", false));
            txn.append_page_item(page.id, kept.id).unwrap();
            (page, kept)
        };
        let before = state.to_snapshot();

        let mut txn = WriteTransaction::new(&mut state);
        let other = txn.create_item(page.id, ItemData::new("other", false));
        txn.append_page_item(page.id, other.id).unwrap();
        txn.update_item(kept.id, ItemData::new("changed", true)).unwrap();
        txn.remove_page_item(page.id, kept.id).unwrap();
        txn.delete_item(kept.id).unwrap();
        txn.delete_page(page.id).unwrap();
        txn.create_page();
        assert!(txn.is_dirty());
        txn.rollback();

        assert_eq!(state.to_snapshot(), before);
    }

    #[test]
    fn reads_see_own_writes() {
        let mut state = State::default();
        let mut txn = WriteTransaction::new(&mut state);
        let page = txn.create_page();
        let item = txn.create_item(page.id, ItemData::new("x", false));
        txn.append_page_item(page.id, item.id).unwrap();

        assert_eq!(txn.get_page(page.id).unwrap().items, vec![item.id]);
        let filter = ItemFilter::all().in_page(page.id);
        assert_eq!(txn.items(&filter).count(), 1);
    }

    #[test]
    fn missing_entities_are_not_found() {
        let mut state = State::default();
        let mut txn = WriteTransaction::new(&mut state);
        let id = EntityId::new();

        assert!(txn.append_page_item(id, id).unwrap_err().is_not_found());
        assert!(txn.delete_page(id).unwrap_err().is_not_found());
        assert!(txn
            .update_item(id, ItemData::new("x", true))
            .unwrap_err()
            .is_not_found());
        assert!(txn.delete_item(id).unwrap_err().is_not_found());
        assert!(!txn.is_dirty());
    }

    #[test]
    fn removing_absent_member_is_clean() {
        let mut state = State::default();
        let page = WriteTransaction::new(&mut state).create_page();

        let mut txn = WriteTransaction::new(&mut state);
        assert_eq!(txn.remove_page_item(page.id, EntityId::new()).unwrap(), 0);
        assert!(!txn.is_dirty());
    }

    #[test]
    fn snapshot_roundtrip_keeps_order_and_counter() {
        let mut state = State::default();
        {
            let mut txn = WriteTransaction::new(&mut state);
            let page = txn.create_page();
            for text in ["a", "b", "c"] {
                let item = txn.create_item(page.id, ItemData::new(text, false));
                txn.append_page_item(page.id, item.id).unwrap();
            }
        }

        let restored = State::from_snapshot(state.to_snapshot());
        let texts: Vec<_> = restored.items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, ["a", "b", "c"]);
        assert!(restored.next_sequence >= 4);
    }
}
