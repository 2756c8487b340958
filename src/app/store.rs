//! Ordered, deduplicated item collection for one directory session.
//!
//! Items are kept in first-seen order. A `HashMap` from id to position backs the
//! duplicate check and the id lookups used to re-derive the open viewer index, so
//! both stay O(1) however many pages have been merged.

use crate::domain::Item;
use std::collections::HashMap;

/// Append-only list of items for the current directory.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Vec<Item>,
    positions: HashMap<String, usize>,
}

impl ItemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every item. Called when a directory session starts.
    pub fn reset(&mut self) {
        self.items.clear();
        self.positions.clear();
    }

    /// Appends the items whose id has not been seen yet, keeping their incoming
    /// order, and returns how many were added.
    ///
    /// Replaying a page is harmless: every id is already present, so nothing
    /// changes and `0` is returned. Items already placed are never moved.
    ///
    /// # Examples
    ///
    /// ```
    /// use galleria::app::store::ItemStore;
    /// use galleria::domain::Item;
    ///
    /// let mut store = ItemStore::new();
    /// let page = vec![Item::new("a", "a"), Item::new("b", "b")];
    /// assert_eq!(store.merge(page.clone()), 2);
    /// assert_eq!(store.merge(page), 0);
    /// assert_eq!(store.len(), 2);
    /// ```
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = Item>) -> usize {
        let before = self.items.len();

        for item in incoming {
            if self.positions.contains_key(&item.id) {
                continue;
            }
            self.positions.insert(item.id.clone(), self.items.len());
            self.items.push(item);
        }

        let added = self.items.len() - before;
        tracing::trace!(added, total = self.items.len(), "items merged");
        added
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
