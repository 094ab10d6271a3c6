use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use listsync::presentation::{HeadlessPresenter, PresenterEvent, PresenterOp};
use listsync::{
    reconcile, Decision, EntryStore, Item, ItemSource, RefreshDriver, Result, Snapshot,
    TickOutcome, TimeoutPolicy,
};
use proptest::prelude::*;

#[derive(Clone, Default)]
struct SharedSource(Rc<RefCell<Snapshot>>);

impl ItemSource for SharedSource {
    fn snapshot(&self) -> Result<Snapshot> {
        Ok(self.0.borrow().clone())
    }
}

#[derive(Debug, Clone)]
enum Step {
    Tick(Snapshot),
    Frame,
    Fail(PresenterOp),
}

fn snapshot_strategy() -> impl Strategy<Value = Snapshot> {
    prop::collection::vec(("[a-f]", "[1-3]x [A-C]"), 0..6).prop_map(|rows| {
        rows.into_iter()
            .map(|(id, text)| Item::new(id, text))
            .collect()
    })
}

fn op_strategy() -> impl Strategy<Value = PresenterOp> {
    prop_oneof![
        Just(PresenterOp::CreateEntry),
        Just(PresenterOp::UpdateEntryText),
        Just(PresenterOp::RemoveEntry),
        Just(PresenterOp::PlayTransition),
    ]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => snapshot_strategy().prop_map(Step::Tick),
        4 => Just(Step::Frame),
        1 => op_strategy().prop_map(Step::Fail),
    ]
}

/// Ids of `snapshot` in order, first occurrence wins
fn unique_ids(snapshot: &[Item]) -> Vec<String> {
    let mut seen = HashSet::new();
    snapshot
        .iter()
        .filter(|item| seen.insert(item.id.clone()))
        .map(|item| item.id.clone())
        .collect()
}

fn store_from(snapshot: &[Item]) -> EntryStore<usize> {
    let mut store = EntryStore::new();
    let mut seen = HashSet::new();
    for (handle, item) in snapshot.iter().enumerate() {
        if seen.insert(item.id.clone()) {
            store.upsert(item.id.clone(), item.display_text.clone(), handle);
        }
    }
    store
}

fn settle(driver: &mut RefreshDriver<SharedSource, HeadlessPresenter>) -> bool {
    for _ in 0..100 {
        if driver.is_settled() {
            return true;
        }
        driver.presenter_mut().advance_frame();
        driver.on_frame();
    }
    driver.is_settled()
}

proptest! {
    #[test]
    fn guard_is_always_released(steps in prop::collection::vec(step_strategy(), 1..40)) {
        let source = SharedSource::default();
        let mut driver = RefreshDriver::new(source.clone(), HeadlessPresenter::new(2))
            .with_policy(TimeoutPolicy { poll_cap: 8, progress_interval: 0 });

        for step in steps {
            match step {
                Step::Tick(snapshot) => {
                    *source.0.borrow_mut() = snapshot;
                    let outcome = driver.on_tick();
                    if !matches!(outcome, TickOutcome::RebuildStarted { .. } | TickOutcome::Skipped) {
                        prop_assert!(!driver.is_busy(), "guard held after {:?}", outcome);
                    }
                }
                Step::Frame => {
                    driver.presenter_mut().advance_frame();
                    driver.on_frame();
                }
                Step::Fail(op) => driver.presenter_mut().fail_next(op),
            }
        }

        prop_assert!(settle(&mut driver));
        prop_assert!(!driver.is_busy());
    }

    #[test]
    fn settled_store_matches_presentation(steps in prop::collection::vec(step_strategy(), 1..40)) {
        let source = SharedSource::default();
        let mut driver = RefreshDriver::new(source.clone(), HeadlessPresenter::new(1));

        for step in steps {
            match step {
                Step::Tick(snapshot) => {
                    *source.0.borrow_mut() = snapshot;
                    driver.on_tick();
                }
                Step::Frame => {
                    driver.presenter_mut().advance_frame();
                    driver.on_frame();
                }
                Step::Fail(op) => driver.presenter_mut().fail_next(op),
            }
        }
        prop_assert!(settle(&mut driver));
        prop_assert_eq!(driver.presenter().visible(), driver.store().texts());

        // Still consistent once a pending failure has had a chance to fire
        driver.on_tick();
        prop_assert!(settle(&mut driver));
        prop_assert_eq!(driver.presenter().visible(), driver.store().texts());
    }

    #[test]
    fn second_reconcile_is_an_empty_patch(snapshot in snapshot_strategy()) {
        let store = store_from(&snapshot);
        let first = reconcile(&store, &snapshot);
        prop_assert!(first.is_noop());
        prop_assert_eq!(reconcile(&store, &snapshot), first);
        prop_assert_eq!(store.ids().collect::<Vec<_>>(), unique_ids(&snapshot));
    }

    #[test]
    fn structural_change_rebuilds_to_new_ids(
        first in snapshot_strategy(),
        second in snapshot_strategy(),
    ) {
        prop_assume!(unique_ids(&first) != unique_ids(&second));

        let source = SharedSource::default();
        *source.0.borrow_mut() = first;
        let mut driver = RefreshDriver::new(source.clone(), HeadlessPresenter::new(1));
        driver.initialize().unwrap();

        *source.0.borrow_mut() = second.clone();
        let started = matches!(driver.on_tick(), TickOutcome::RebuildStarted { .. });
        prop_assert!(started);
        prop_assert!(settle(&mut driver));

        let ids: Vec<String> = driver.store().ids().map(str::to_string).collect();
        prop_assert_eq!(ids, unique_ids(&second));
    }

    #[test]
    fn text_only_change_patches_exactly_changed_ids(
        snapshot in snapshot_strategy(),
        edits in prop::collection::vec(any::<bool>(), 6),
    ) {
        let next: Snapshot = snapshot
            .iter()
            .zip(edits.iter().cycle())
            .map(|(item, edit)| {
                let text = if *edit {
                    format!("{} (edited)", item.display_text)
                } else {
                    item.display_text.clone()
                };
                Item::new(item.id.clone(), text)
            })
            .collect();

        let store = store_from(&snapshot);
        let expected: Vec<String> = store
            .iter()
            .filter(|entry| {
                next.iter()
                    .find(|item| item.id == entry.id)
                    .is_some_and(|item| item.display_text != entry.display_text)
            })
            .map(|entry| entry.id.clone())
            .collect();

        match reconcile(&store, &next) {
            Decision::InPlacePatch(changes) => {
                let ids: Vec<String> = changes.into_iter().map(|change| change.id).collect();
                prop_assert_eq!(ids, expected.clone());
            }
            other => prop_assert!(false, "expected in-place patch, got {:?}", other),
        }

        // Driven end to end, the patch never creates or removes entries
        let source = SharedSource::default();
        *source.0.borrow_mut() = snapshot;
        let mut driver = RefreshDriver::new(source.clone(), HeadlessPresenter::new(0));
        driver.initialize().unwrap();
        driver.presenter_mut().take_journal();

        *source.0.borrow_mut() = next;
        prop_assert_eq!(driver.on_tick(), TickOutcome::Patched { changed: expected.len() });
        let journal = driver.presenter_mut().take_journal();
        let all_updated = journal.iter().all(|event| matches!(event, PresenterEvent::Updated { .. }));
        prop_assert!(all_updated);
        prop_assert_eq!(journal.len(), expected.len());
    }
}
