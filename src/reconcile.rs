//! Reconciler: decides how a new snapshot is applied to the entry store.
//!
//! The decision is deliberately coarse. Any structural change, even a single added or
//! removed id, rebuilds the whole list because the presentation's exit/enter
//! transitions are defined over the whole container. Only text changes over an
//! unchanged, identically ordered id sequence are patched in place.

use crate::item::{unique_items, Item};
use crate::store::EntryStore;
use std::collections::HashSet;

/// A single entry whose text differs between the store and the snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub id: String,
    pub previous: String,
    pub next: String,
}

/// Structural difference that forced a rebuild, kept for logging and statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralDiff {
    /// Snapshot ids missing from the store, in snapshot order
    pub added: Vec<String>,
    /// Store ids missing from the snapshot, in display order
    pub removed: Vec<String>,
    /// Same ids on both sides but in a different order
    pub reordered: bool,
}

/// Patch strategy selected for one reconciliation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Update the text of the listed entries directly. May be empty.
    InPlacePatch(Vec<TextChange>),
    /// Tear the whole list down and recreate it from the snapshot
    FullRebuild(StructuralDiff),
}

impl Decision {
    /// True for an in-place patch with nothing to change
    pub fn is_noop(&self) -> bool {
        matches!(self, Decision::InPlacePatch(changed) if changed.is_empty())
    }
}

/// Compare the store against `snapshot` and choose a patch strategy.
///
/// Pure: the store is only read. Duplicate ids in the snapshot are resolved
/// first-occurrence-wins, the same way a rebuild populates the store.
pub fn reconcile<H>(store: &EntryStore<H>, snapshot: &[Item]) -> Decision {
    let items = unique_items(snapshot);
    let store_ids = store.snapshot_ids();
    let snapshot_ids: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();

    let added: Vec<String> = items
        .iter()
        .filter(|item| !store_ids.contains(item.id.as_str()))
        .map(|item| item.id.clone())
        .collect();
    let removed: Vec<String> = store
        .ids()
        .filter(|id| !snapshot_ids.contains(id))
        .map(str::to_string)
        .collect();

    if !added.is_empty() || !removed.is_empty() {
        return Decision::FullRebuild(StructuralDiff {
            added,
            removed,
            reordered: false,
        });
    }

    if !store.ids().eq(items.iter().map(|item| item.id.as_str())) {
        return Decision::FullRebuild(StructuralDiff {
            reordered: true,
            ..StructuralDiff::default()
        });
    }

    let changed = items
        .iter()
        .filter_map(|item| {
            let entry = store.get(&item.id)?;
            (entry.display_text != item.display_text).then(|| TextChange {
                id: item.id.clone(),
                previous: entry.display_text.clone(),
                next: item.display_text.clone(),
            })
        })
        .collect();

    Decision::InPlacePatch(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(rows: &[(&str, &str)]) -> EntryStore<usize> {
        let mut store = EntryStore::new();
        for (handle, (id, text)) in rows.iter().enumerate() {
            store.upsert(*id, *text, handle);
        }
        store
    }

    fn snapshot_of(rows: &[(&str, &str)]) -> Vec<Item> {
        rows.iter().map(|(id, text)| Item::new(*id, *text)).collect()
    }

    #[test]
    fn identical_snapshot_is_an_empty_patch() {
        let store = store_of(&[("A", "1x Apple"), ("B", "2x Banana")]);
        let decision = reconcile(&store, &snapshot_of(&[("A", "1x Apple"), ("B", "2x Banana")]));
        assert_eq!(decision, Decision::InPlacePatch(Vec::new()));
        assert!(decision.is_noop());
    }

    #[test]
    fn text_change_is_patched_in_place() {
        let store = store_of(&[("A", "1x Apple"), ("B", "2x Banana")]);
        let decision = reconcile(&store, &snapshot_of(&[("A", "3x Apple"), ("B", "2x Banana")]));
        assert_eq!(
            decision,
            Decision::InPlacePatch(vec![TextChange {
                id: "A".to_string(),
                previous: "1x Apple".to_string(),
                next: "3x Apple".to_string(),
            }])
        );
        assert!(!decision.is_noop());
    }

    #[test]
    fn addition_forces_full_rebuild() {
        let store = store_of(&[("A", "1x Apple")]);
        let decision = reconcile(&store, &snapshot_of(&[("A", "1x Apple"), ("C", "1x Cherry")]));
        assert_eq!(
            decision,
            Decision::FullRebuild(StructuralDiff {
                added: vec!["C".to_string()],
                removed: Vec::new(),
                reordered: false,
            })
        );
    }

    #[test]
    fn empty_snapshot_rebuilds_to_empty_list() {
        let store = store_of(&[("A", "1x Apple"), ("B", "2x Banana")]);
        match reconcile(&store, &[]) {
            Decision::FullRebuild(diff) => {
                assert!(diff.added.is_empty());
                assert_eq!(diff.removed, vec!["A".to_string(), "B".to_string()]);
            }
            other => panic!("expected rebuild, got {other:?}"),
        }
    }

    #[test]
    fn reordering_counts_as_structural() {
        let store = store_of(&[("A", "a"), ("B", "b")]);
        let decision = reconcile(&store, &snapshot_of(&[("B", "b"), ("A", "a")]));
        assert_eq!(
            decision,
            Decision::FullRebuild(StructuralDiff {
                reordered: true,
                ..StructuralDiff::default()
            })
        );
    }

    #[test]
    fn duplicate_ids_compare_first_occurrence() {
        let store = store_of(&[("A", "1x Apple")]);
        let decision = reconcile(&store, &snapshot_of(&[("A", "1x Apple"), ("A", "5x Apple")]));
        assert!(decision.is_noop());
    }

    #[test]
    fn empty_store_and_empty_snapshot_is_noop() {
        let store: EntryStore<usize> = EntryStore::new();
        assert!(reconcile(&store, &[]).is_noop());
    }
}
