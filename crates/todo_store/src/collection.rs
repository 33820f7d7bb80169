//! Insertion-ordered document collections.

use crate::id::EntityId;
use crate::model::Document;
use std::collections::{BTreeMap, HashMap};

/// Sequence number stamped on a document when it is first inserted.
pub type SequenceNumber = u64;

/// A collection of documents that enumerates in insertion order.
///
/// Each document keeps the sequence number it was created with, so
/// replacing a document does not move it in the listing.
#[derive(Debug, Clone)]
pub struct Collection<T: Document> {
    records: HashMap<EntityId, (SequenceNumber, T)>,
    order: BTreeMap<SequenceNumber, EntityId>,
}

impl<T: Document> Collection<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            order: BTreeMap::new(),
        }
    }

    /// Gets a document by ID.
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.records.get(&id).map(|(_, doc)| doc)
    }

    /// Gets a mutable reference to a document.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.records.get_mut(&id).map(|(_, doc)| doc)
    }

    /// Returns the sequence number of a document.
    pub fn sequence_of(&self, id: EntityId) -> Option<SequenceNumber> {
        self.records.get(&id).map(|(seq, _)| *seq)
    }

    /// Inserts a document at `seq`, returning the previous version.
    ///
    /// If a document with the same ID already exists it is replaced and
    /// keeps its original position; `seq` is ignored in that case.
    pub fn insert(&mut self, seq: SequenceNumber, doc: T) -> Option<T> {
        let id = doc.id();
        match self.records.get_mut(&id) {
            Some((_, existing)) => Some(std::mem::replace(existing, doc)),
            None => {
                self.order.insert(seq, id);
                self.records.insert(id, (seq, doc));
                None
            }
        }
    }

    /// Removes a document, returning it with its sequence number.
    pub fn remove(&mut self, id: EntityId) -> Option<(SequenceNumber, T)> {
        let (seq, doc) = self.records.remove(&id)?;
        self.order.remove(&seq);
        Some((seq, doc))
    }

    /// Iterates over documents in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.order
            .values()
            .filter_map(move |id| self.records.get(id).map(|(_, doc)| doc))
    }

    /// Returns the number of documents.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: Document> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Item, ItemData, Page};

    #[test]
    fn iterates_in_insertion_order() {
        let mut pages = Collection::new();
        let ids: Vec<_> = (0..5)
            .map(|seq| {
                let page = Page::new();
                let id = page.id;
                pages.insert(seq, page);
                id
            })
            .collect();

        let listed: Vec<_> = pages.iter().map(|p| p.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn replace_keeps_position() {
        let mut items = Collection::new();
        let page = EntityId::new();
        let first = Item::new(page, ItemData::new("first", false));
        let second = Item::new(page, ItemData::new("second", false));
        items.insert(1, first.clone());
        items.insert(2, second.clone());

        let mut updated = first.clone();
        updated.done = true;
        let previous = items.insert(99, updated);

        assert_eq!(previous, Some(first.clone()));
        assert_eq!(items.sequence_of(first.id), Some(1));
        let listed: Vec<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(listed, vec![first.id, second.id]);
    }

    #[test]
    fn remove_drops_from_order() {
        let mut pages = Collection::new();
        let page = Page::new();
        let id = page.id;
        pages.insert(7, page);

        let (seq, removed) = pages.remove(id).unwrap();
        assert_eq!(seq, 7);
        assert_eq!(removed.id, id);
        assert!(pages.is_empty());
        assert_eq!(pages.iter().count(), 0);
        assert!(pages.remove(id).is_none());
    }
}
