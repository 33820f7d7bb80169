//! Page and item documents.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of entity held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A page owning an ordered list of items.
    Page,
    /// A to-do entry belonging to exactly one page.
    Item,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Page => f.write_str("Page"),
            EntityKind::Item => f.write_str("Item"),
        }
    }
}

/// A document stored in one of the store's collections.
pub trait Document: Clone {
    /// Kind reported in not-found errors.
    const KIND: EntityKind;

    /// Returns the document's identifier.
    fn id(&self) -> EntityId;
}

/// A to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier.
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Owning page. Fixed for the item's lifetime.
    pub page: EntityId,
    /// Non-empty description.
    pub text: String,
    /// Completion flag.
    #[serde(default)]
    pub done: bool,
}

impl Item {
    /// Creates a new item with a fresh identifier.
    pub fn new(page: EntityId, data: ItemData) -> Self {
        Self {
            id: EntityId::new(),
            page,
            text: data.text,
            done: data.done,
        }
    }

    /// Overwrites the mutable fields.
    pub fn apply(&mut self, data: ItemData) {
        self.text = data.text;
        self.done = data.done;
    }
}

impl Document for Item {
    const KIND: EntityKind = EntityKind::Item;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// A page of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page identifier.
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Member items, in insertion order.
    #[serde(default)]
    pub items: Vec<EntityId>,
}

impl Page {
    /// Creates an empty page with a fresh identifier.
    pub fn new() -> Self {
        Self {
            id: EntityId::new(),
            items: Vec::new(),
        }
    }

    /// Returns true if the page lists the item.
    pub fn contains(&self, item: EntityId) -> bool {
        self.items.contains(&item)
    }

    /// Removes every occurrence of `item`, returning how many were removed.
    pub fn unlink(&mut self, item: EntityId) -> usize {
        let before = self.items.len();
        self.items.retain(|id| *id != item);
        before - self.items.len()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for Page {
    const KIND: EntityKind = EntityKind::Page;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// The user-supplied fields of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    /// Description.
    pub text: String,
    /// Completion flag.
    pub done: bool,
}

impl ItemData {
    /// Creates item data.
    pub fn new(text: impl Into<String>, done: bool) -> Self {
        Self {
            text: text.into(),
            done,
        }
    }
}

/// Filter for listing items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Only items owned by this page.
    pub page: Option<EntityId>,
    /// Only items with this completion state.
    pub done: Option<bool>,
}

impl ItemFilter {
    /// A filter matching every item.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to items owned by `page`.
    #[must_use]
    pub fn in_page(mut self, page: EntityId) -> Self {
        self.page = Some(page);
        self
    }

    /// Restricts to items with the given completion state.
    #[must_use]
    pub fn done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }

    /// Returns true if `item` passes the filter.
    pub fn matches(&self, item: &Item) -> bool {
        self.page.map_or(true, |page| item.page == page)
            && self.done.map_or(true, |done| item.done == done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_page_is_empty() {
        let page = Page::new();
        assert!(page.items.is_empty());
    }

    #[test]
    fn unlink_removes_all_occurrences() {
        let mut page = Page::new();
        let a = EntityId::new();
        let b = EntityId::new();
        page.items = vec![a, b, a];

        assert_eq!(page.unlink(a), 2);
        assert_eq!(page.items, vec![b]);
        assert_eq!(page.unlink(a), 0);
    }

    #[test]
    fn item_json_shape() {
        let page = EntityId::from_bytes([1; 12]);
        let item = Item {
            id: EntityId::from_bytes([2; 12]),
            page,
            text: "Buy milk".into(),
            done: false,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["_id"], "020202020202020202020202");
        assert_eq!(json["page"], "010101010101010101010101");
        assert_eq!(json["text"], "Buy milk");
        assert_eq!(json["done"], false);
    }

    #[test]
    fn page_json_lists_item_ids() {
        let mut page = Page::new();
        let item = EntityId::new();
        page.items.push(item);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["items"][0], item.to_string());
    }

    #[test]
    fn filter_matching() {
        let page = EntityId::new();
        let item = Item::new(page, ItemData::new("a", true));

        assert!(ItemFilter::all().matches(&item));
        assert!(ItemFilter::all().in_page(page).matches(&item));
        assert!(!ItemFilter::all().in_page(EntityId::new()).matches(&item));
        assert!(ItemFilter::all().done(true).matches(&item));
        assert!(!ItemFilter::all().in_page(page).done(false).matches(&item));
    }

    #[test]
    fn apply_overwrites_fields() {
        let mut item = Item::new(EntityId::new(), ItemData::new("old", false));
        let id = item.id;
        item.apply(ItemData::new("new", true));
        assert_eq!(item.id, id);
        assert_eq!(item.text, "new");
        assert!(item.done);
    }
}
