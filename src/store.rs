//! Entry store: the authoritative record of what is currently displayed.
//!
//! The store maps each item id to the text last pushed to the presentation layer and
//! the opaque handle addressing that entry. Insertion order is the display order.
//! The store never talks to the presentation adapter; callers decide how store
//! mutations and presentation calls interleave.

use indexmap::IndexMap;
use std::collections::HashSet;

/// One currently displayed item paired with its presentation handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<H> {
    pub id: String,
    pub display_text: String,
    pub handle: H,
}

/// Ordered mapping `id -> Entry`
#[derive(Debug)]
pub struct EntryStore<H> {
    entries: IndexMap<String, Entry<H>>,
}

impl<H> Default for EntryStore<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> EntryStore<H> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Entry<H>> {
        self.entries.get(id)
    }

    /// Insert a new entry at the end, or overwrite an existing one in place.
    ///
    /// Returns the displaced handle when an entry was overwritten so the caller can
    /// dispose of it through the presentation adapter.
    pub fn upsert(
        &mut self,
        id: impl Into<String>,
        display_text: impl Into<String>,
        handle: H,
    ) -> Option<H> {
        let id = id.into();
        let entry = Entry {
            id: id.clone(),
            display_text: display_text.into(),
            handle,
        };
        self.entries.insert(id, entry).map(|previous| previous.handle)
    }

    /// Replace the recorded text of an existing entry, keeping its handle.
    ///
    /// Returns the previous text, or `None` if the id is unknown.
    pub fn set_text(&mut self, id: &str, display_text: impl Into<String>) -> Option<String> {
        self.entries
            .get_mut(id)
            .map(|entry| std::mem::replace(&mut entry.display_text, display_text.into()))
    }

    /// Delete an entry, preserving the order of the others, and hand back its handle
    pub fn remove(&mut self, id: &str) -> Option<H> {
        self.entries.shift_remove(id).map(|entry| entry.handle)
    }

    /// Last entry in display order
    pub fn last(&self) -> Option<&Entry<H>> {
        self.entries.last().map(|(_, entry)| entry)
    }

    /// Remove the last entry in display order
    pub fn pop_last(&mut self) -> Option<Entry<H>> {
        self.entries.pop().map(|(_, entry)| entry)
    }

    /// Set of ids currently held, used for diffing
    pub fn snapshot_ids(&self) -> HashSet<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Ids in display order
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry<H>> + '_ {
        self.entries.values()
    }

    /// `(id, text)` pairs in display order
    pub fn texts(&self) -> Vec<(&str, &str)> {
        self.entries
            .values()
            .map(|entry| (entry.id.as_str(), entry.display_text.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_preserves_insertion_order() {
        let mut store = EntryStore::new();
        assert!(store.upsert("B", "2x Banana", 1).is_none());
        assert!(store.upsert("A", "1x Apple", 2).is_none());

        assert_eq!(store.ids().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(store.get("A").map(|e| e.handle), Some(2));
    }

    #[test]
    fn upsert_overwrite_returns_displaced_handle() {
        let mut store = EntryStore::new();
        store.upsert("A", "1x Apple", 10);
        store.upsert("B", "2x Banana", 11);

        let displaced = store.upsert("A", "3x Apple", 12);
        assert_eq!(displaced, Some(10));
        // Overwriting keeps the original position
        assert_eq!(store.texts(), vec![("A", "3x Apple"), ("B", "2x Banana")]);
    }

    #[test]
    fn remove_returns_handle_and_keeps_order() {
        let mut store = EntryStore::new();
        store.upsert("A", "a", 1);
        store.upsert("B", "b", 2);
        store.upsert("C", "c", 3);

        assert_eq!(store.remove("B"), Some(2));
        assert_eq!(store.remove("B"), None);
        assert_eq!(store.ids().collect::<Vec<_>>(), vec!["A", "C"]);
    }

    #[test]
    fn set_text_only_touches_known_ids() {
        let mut store = EntryStore::new();
        store.upsert("A", "1x Apple", 7);

        assert_eq!(store.set_text("A", "3x Apple"), Some("1x Apple".to_string()));
        assert_eq!(store.set_text("Z", "nothing"), None);
        assert_eq!(store.get("A").unwrap().handle, 7);
        assert_eq!(store.get("A").unwrap().display_text, "3x Apple");
    }

    #[test]
    fn snapshot_ids_and_pop_last() {
        let mut store = EntryStore::new();
        store.upsert("A", "a", 1);
        store.upsert("B", "b", 2);

        let ids = store.snapshot_ids();
        assert!(ids.contains("A") && ids.contains("B"));
        assert_eq!(ids.len(), 2);

        assert_eq!(store.last().map(|e| e.handle), Some(2));
        assert_eq!(store.pop_last().map(|e| e.id), Some("B".to_string()));
        assert_eq!(store.pop_last().map(|e| e.id), Some("A".to_string()));
        assert!(store.pop_last().is_none());
        assert!(store.is_empty());
    }
}
