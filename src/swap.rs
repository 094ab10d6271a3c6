//! Per-entry animated text swaps.
//!
//! When the driver runs with [`TextSwapStyle::Animated`], an in-place patch records the
//! new text in the store immediately and queues one [`SwapQueue`] job per changed entry.
//! Each job plays the entry's exit transition, swaps the text, plays the entry's enter
//! transition and finishes. Jobs advance from the host frame callback and never hold the
//! reconciliation guard.

use crate::error::Result;
use crate::presentation::{PresentationAdapter, Transition, TransitionTarget};
use crate::reconcile::TextChange;
use crate::sequencer::{TimeoutPolicy, TransitionWait, WaitStatus};
use crate::store::EntryStore;
use indexmap::IndexMap;
use log::{debug, warn};

/// How in-place text changes reach the presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config",
    derive(serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum TextSwapStyle {
    /// Call `update_entry_text` during the tick
    #[default]
    Immediate,
    /// Exit, update and enter the entry over the following frames
    Animated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwapPhase {
    Pending,
    ExitPlaying,
    EnterPlaying,
}

#[derive(Debug)]
struct EntrySwap {
    /// Text the widget currently shows
    shown: String,
    /// Text the widget should end up showing
    target: String,
    phase: SwapPhase,
    wait: TransitionWait,
    timeouts: u32,
}

impl EntrySwap {
    /// Advance one frame. Returns true once the swap is complete.
    fn step<P: PresentationAdapter>(
        &mut self,
        handle: &P::Handle,
        presenter: &mut P,
        policy: &TimeoutPolicy,
    ) -> Result<bool> {
        match self.phase {
            SwapPhase::Pending => {
                presenter.play_transition(TransitionTarget::Entry(handle), Transition::Exit)?;
                self.phase = SwapPhase::ExitPlaying;
                self.wait = TransitionWait::default();
                Ok(false)
            }
            SwapPhase::ExitPlaying => {
                let playing = presenter.is_playing(TransitionTarget::Entry(handle));
                match self.wait.poll(playing, policy, "entry exit") {
                    WaitStatus::Waiting => return Ok(false),
                    WaitStatus::TimedOut => self.timeouts += 1,
                    WaitStatus::Done => {}
                }
                presenter.update_entry_text(handle, &self.target)?;
                self.shown.clone_from(&self.target);
                presenter.play_transition(TransitionTarget::Entry(handle), Transition::Enter)?;
                self.phase = SwapPhase::EnterPlaying;
                self.wait = TransitionWait::default();
                Ok(false)
            }
            SwapPhase::EnterPlaying => {
                let playing = presenter.is_playing(TransitionTarget::Entry(handle));
                match self.wait.poll(playing, policy, "entry enter") {
                    WaitStatus::Waiting => Ok(false),
                    WaitStatus::TimedOut => {
                        self.timeouts += 1;
                        Ok(true)
                    }
                    WaitStatus::Done => Ok(true),
                }
            }
        }
    }
}

/// What the swap queue did during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapReport {
    pub completed: usize,
    pub failed: usize,
    pub dropped: usize,
    pub timeouts: u32,
}

/// Pending swaps keyed by entry id, in the order they were queued
#[derive(Debug, Default)]
pub struct SwapQueue {
    swaps: IndexMap<String, EntrySwap>,
}

impl SwapQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.swaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty()
    }

    /// Target text of the pending swap for `id`
    pub fn target(&self, id: &str) -> Option<&str> {
        self.swaps.get(id).map(|swap| swap.target.as_str())
    }

    /// Queue a swap for `change`. A newer text for an id already queued replaces its
    /// target; a swap that already updated the widget starts over.
    pub fn queue(&mut self, change: TextChange) {
        if let Some(swap) = self.swaps.get_mut(&change.id) {
            debug!(
                "Retargeting swap for '{}': {} -> {}",
                change.id, swap.target, change.next
            );
            swap.target = change.next;
            if swap.phase == SwapPhase::EnterPlaying {
                swap.phase = SwapPhase::Pending;
            }
            return;
        }

        debug!(
            "Queueing swap for '{}': {} -> {}",
            change.id, change.previous, change.next
        );
        self.swaps.insert(
            change.id,
            EntrySwap {
                shown: change.previous,
                target: change.next,
                phase: SwapPhase::Pending,
                wait: TransitionWait::default(),
                timeouts: 0,
            },
        );
    }

    /// Drop every pending swap. Only valid when the entries are about to be recreated.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.swaps.len();
        self.swaps.clear();
        cancelled
    }

    /// Advance every pending swap by one frame.
    ///
    /// Swaps whose entry left the store are dropped. A failed swap writes the text the
    /// widget still shows back into the store, so the next tick detects the change again.
    pub fn on_frame<P: PresentationAdapter>(
        &mut self,
        store: &mut EntryStore<P::Handle>,
        presenter: &mut P,
        policy: &TimeoutPolicy,
    ) -> SwapReport {
        let mut report = SwapReport::default();
        let mut finished = Vec::new();

        for (id, swap) in self.swaps.iter_mut() {
            let Some(entry) = store.get(id) else {
                debug!("Dropping swap for removed entry '{}'", id);
                report.dropped += 1;
                finished.push(id.clone());
                continue;
            };

            match swap.step(&entry.handle, presenter, policy) {
                Ok(false) => {}
                Ok(true) => {
                    report.completed += 1;
                    report.timeouts += swap.timeouts;
                    finished.push(id.clone());
                }
                Err(err) => {
                    warn!("Text swap for '{}' failed: {}", id, err);
                    store.set_text(id, swap.shown.clone());
                    report.failed += 1;
                    report.timeouts += swap.timeouts;
                    finished.push(id.clone());
                }
            }
        }

        for id in finished {
            self.swaps.shift_remove(&id);
        }
        report
    }
}
