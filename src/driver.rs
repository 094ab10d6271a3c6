//! Refresh driver: the per-list entry point the host calls on every tick and frame.
//!
//! A tick acquires the reconciliation guard, pulls a snapshot and either patches text
//! in place (releasing the guard before returning) or hands the guard to the
//! transition sequencer for a full rebuild. Ticks that arrive while the guard is held
//! are dropped, not queued. Neither `on_tick` nor `on_frame` returns errors: failures
//! are logged and reported through the outcome enums, and the next tick reconciles
//! against whatever the store holds.

use crate::error::{ListError, Result};
use crate::guard::{GuardToken, ReconciliationGuard};
use crate::item::ItemSource;
use crate::presentation::PresentationAdapter;
use crate::reconcile::{reconcile, Decision, StructuralDiff, TextChange};
use crate::sequencer::{
    rebuild, tear_down, RebuildReport, SequenceStep, SequencerPhase, TimeoutPolicy,
    TransitionSequencer,
};
use crate::store::EntryStore;
use crate::swap::{SwapQueue, TextSwapStyle};
use log::{debug, error, info};

/// What one tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A cycle was already in flight; the tick was dropped
    Skipped,
    /// A collaborator was not ready; nothing changed
    Deferred,
    /// First population of the list, without transitions
    Initialized { entries: usize },
    /// Texts updated in place (possibly none)
    Patched { changed: usize },
    /// A full rebuild began and continues on later frames
    RebuildStarted {
        added: usize,
        removed: usize,
        reordered: bool,
    },
    /// The cycle failed and was abandoned
    Failed,
}

/// What one frame did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Idle,
    InProgress(SequencerPhase),
    Completed(RebuildReport),
    Aborted,
}

/// Counters for the host's status line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub ticks: u64,
    pub skipped: u64,
    pub deferred: u64,
    pub patches: u64,
    pub rebuilds_started: u64,
    pub rebuilds_completed: u64,
    pub swaps_completed: u64,
    pub timeouts: u64,
    pub failures: u64,
}

/// Keeps one presented list in sync with its item source
pub struct RefreshDriver<S, P: PresentationAdapter> {
    source: S,
    presenter: P,
    store: EntryStore<P::Handle>,
    guard: ReconciliationGuard,
    sequencer: TransitionSequencer,
    swaps: SwapQueue,
    swap_style: TextSwapStyle,
    initialized: bool,
    stats: DriverStats,
}

impl<S: ItemSource, P: PresentationAdapter> RefreshDriver<S, P> {
    pub fn new(source: S, presenter: P) -> Self {
        Self {
            source,
            presenter,
            store: EntryStore::new(),
            guard: ReconciliationGuard::new(),
            sequencer: TransitionSequencer::default(),
            swaps: SwapQueue::new(),
            swap_style: TextSwapStyle::default(),
            initialized: false,
            stats: DriverStats::default(),
        }
    }

    /// Replace the transition timeout policy. Takes effect for the next rebuild.
    pub fn with_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.sequencer = TransitionSequencer::new(policy);
        self
    }

    pub fn with_swap_style(mut self, style: TextSwapStyle) -> Self {
        self.swap_style = style;
        self
    }

    /// Populate the list from the first snapshot without playing any transition.
    ///
    /// Must be called at most once; returns the number of entries created.
    pub fn initialize(&mut self) -> Result<usize> {
        if self.initialized {
            return Err(ListError::AlreadyInitialized);
        }
        let _token = self.guard.try_acquire().ok_or_else(|| {
            ListError::other("cannot initialize while a reconciliation is in flight")
        })?;
        self.ensure_ready()?;
        self.initialize_now()
    }

    /// Host tick callback
    pub fn on_tick(&mut self) -> TickOutcome {
        self.stats.ticks += 1;
        let Some(token) = self.guard.try_acquire() else {
            debug!("Reconciliation already in progress, skipping tick");
            self.stats.skipped += 1;
            return TickOutcome::Skipped;
        };

        match self.run_cycle(token) {
            Ok(outcome) => outcome,
            Err(err) if err.is_missing_dependency() => {
                debug!("Deferring tick: {}", err);
                self.stats.deferred += 1;
                TickOutcome::Deferred
            }
            Err(err) => {
                error!("Reconciliation cycle failed: {}", err);
                self.stats.failures += 1;
                TickOutcome::Failed
            }
        }
    }

    /// Host frame callback: resumes pending text swaps and the rebuild sequence
    pub fn on_frame(&mut self) -> FrameOutcome {
        let policy = *self.sequencer.policy();
        let swaps = self
            .swaps
            .on_frame(&mut self.store, &mut self.presenter, &policy);
        self.stats.swaps_completed += swaps.completed as u64;
        self.stats.failures += swaps.failed as u64;
        self.stats.timeouts += u64::from(swaps.timeouts);

        match self.sequencer.on_frame(&mut self.store, &mut self.presenter) {
            Ok(SequenceStep::Idle) => FrameOutcome::Idle,
            Ok(SequenceStep::Pending(phase)) => FrameOutcome::InProgress(phase),
            Ok(SequenceStep::Finished(report)) => {
                self.stats.rebuilds_completed += 1;
                self.stats.timeouts += u64::from(report.timeouts);
                FrameOutcome::Completed(report)
            }
            Err(_) => {
                self.stats.failures += 1;
                FrameOutcome::Aborted
            }
        }
    }

    /// Tear the list down: abandon any rebuild and remove every entry.
    /// Hands the presenter back to the owner.
    pub fn dispose(mut self) -> Result<P> {
        if self.sequencer.abandon() {
            info!("Abandoning in-flight rebuild during dispose");
        }
        let cancelled = self.swaps.cancel_all();
        if cancelled > 0 {
            debug!("Cancelled {} pending text swaps", cancelled);
        }
        let removed = tear_down(&mut self.store, &mut self.presenter)?;
        info!("Disposed list, removed {} entries", removed);
        Ok(self.presenter)
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.presenter.is_ready() {
            Ok(())
        } else {
            Err(ListError::missing("presentation adapter"))
        }
    }

    fn initialize_now(&mut self) -> Result<usize> {
        let snapshot = self.source.snapshot()?;
        info!("Initializing list with {} items", snapshot.len());
        let (_, created) = rebuild(&mut self.store, &snapshot, &mut self.presenter)?;
        self.initialized = true;
        Ok(created)
    }

    fn run_cycle(&mut self, token: GuardToken) -> Result<TickOutcome> {
        self.ensure_ready()?;
        if !self.initialized {
            let entries = self.initialize_now()?;
            return Ok(TickOutcome::Initialized { entries });
        }

        let snapshot = self.source.snapshot()?;
        match reconcile(&self.store, &snapshot) {
            Decision::InPlacePatch(changes) => {
                let changed = changes.len();
                if changed > 0 {
                    self.apply_patch(changes)?;
                    self.stats.patches += 1;
                }
                Ok(TickOutcome::Patched { changed })
            }
            Decision::FullRebuild(diff) => {
                log_structural_change(&diff);
                let cancelled = self.swaps.cancel_all();
                if cancelled > 0 {
                    debug!("Cancelled {} pending text swaps for rebuild", cancelled);
                }
                self.sequencer.start(snapshot, token, &mut self.presenter)?;
                self.stats.rebuilds_started += 1;
                Ok(TickOutcome::RebuildStarted {
                    added: diff.added.len(),
                    removed: diff.removed.len(),
                    reordered: diff.reordered,
                })
            }
        }
    }

    fn apply_patch(&mut self, changes: Vec<TextChange>) -> Result<()> {
        for change in changes {
            let Some(entry) = self.store.get(&change.id) else {
                continue;
            };
            match self.swap_style {
                TextSwapStyle::Immediate => {
                    debug!(
                        "Updating entry '{}': {} -> {}",
                        change.id, change.previous, change.next
                    );
                    self.presenter.update_entry_text(&entry.handle, &change.next)?;
                    self.store.set_text(&change.id, change.next);
                }
                TextSwapStyle::Animated => {
                    self.store.set_text(&change.id, change.next.clone());
                    self.swaps.queue(change);
                }
            }
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether a reconciliation cycle holds the guard
    pub fn is_busy(&self) -> bool {
        self.guard.is_held()
    }

    /// No cycle in flight and no text swap pending
    pub fn is_settled(&self) -> bool {
        !self.is_busy() && self.swaps.is_empty()
    }

    pub fn phase(&self) -> SequencerPhase {
        self.sequencer.phase()
    }

    pub fn pending_swaps(&self) -> usize {
        self.swaps.len()
    }

    pub fn stats(&self) -> &DriverStats {
        &self.stats
    }

    pub fn store(&self) -> &EntryStore<P::Handle> {
        &self.store
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

fn log_structural_change(diff: &StructuralDiff) {
    if diff.reordered {
        info!("List order changed, rebuilding");
    } else {
        info!(
            "List structure changed ({} added, {} removed), rebuilding",
            diff.added.len(),
            diff.removed.len()
        );
        debug!("Added: {:?}, removed: {:?}", diff.added, diff.removed);
    }
}
