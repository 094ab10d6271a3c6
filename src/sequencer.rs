//! Transition sequencer for full rebuilds.
//!
//! State machine: Idle → ExitPlaying → Mutating → EnterPlaying → Idle
//!
//! The sequencer is resumed once per host frame through [`TransitionSequencer::on_frame`].
//! It suspends only while a container transition plays, and each of those two waits is
//! bounded by a [`TimeoutPolicy`]: when the adapter keeps reporting the transition as
//! playing past the cap, the sequencer logs a warning and proceeds anyway. A stalled
//! adapter therefore costs a visual glitch, never a stuck list.
//!
//! An active sequence owns the [`GuardToken`] of its cycle. Finishing, failing or
//! abandoning the sequence drops the token and frees the reconciliation guard.
//!
//! # Failure Modes
//!
//! - Any adapter error aborts the sequence where it stands. The entry store keeps the
//!   partial state reached so far and the next tick reconciles against it.

use crate::error::Result;
use crate::guard::GuardToken;
use crate::item::{unique_items, Item, Snapshot};
use crate::presentation::{PresentationAdapter, Transition, TransitionTarget};
use crate::store::EntryStore;
use log::{debug, error, info, warn};

/// Frames to wait for a transition before proceeding without it
pub const TRANSITION_POLL_CAP: u32 = 1000;

/// Frames between "still waiting" log lines
pub const TRANSITION_PROGRESS_INTERVAL: u32 = 100;

/// Bounded-wait policy applied to every transition wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    /// Frames a transition may keep playing before the wait gives up
    pub poll_cap: u32,
    /// Log progress every this many frames; zero disables progress logging
    pub progress_interval: u32,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            poll_cap: TRANSITION_POLL_CAP,
            progress_interval: TRANSITION_PROGRESS_INTERVAL,
        }
    }
}

/// Current phase of the rebuild sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequencerPhase {
    #[default]
    Idle,
    ExitPlaying,
    Mutating,
    EnterPlaying,
}

/// Outcome of one bounded-wait poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitStatus {
    Waiting,
    Done,
    TimedOut,
}

/// Frame counter for one transition wait
#[derive(Debug, Default)]
pub(crate) struct TransitionWait {
    polls: u32,
}

impl TransitionWait {
    pub(crate) fn poll(&mut self, playing: bool, policy: &TimeoutPolicy, what: &str) -> WaitStatus {
        if !playing {
            return WaitStatus::Done;
        }
        self.polls += 1;
        if self.polls > policy.poll_cap {
            warn!(
                "Timed out waiting for {} transition to finish after {} frames, continuing anyway",
                what, policy.poll_cap
            );
            return WaitStatus::TimedOut;
        }
        if policy.progress_interval > 0 && self.polls % policy.progress_interval == 0 {
            debug!("Waiting for {} transition to finish ({} frames)", what, self.polls);
        }
        WaitStatus::Waiting
    }
}

/// What a completed rebuild did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Entries torn down
    pub removed: usize,
    /// Entries created from the snapshot
    pub created: usize,
    /// Waits that gave up on the adapter (0, 1 or 2)
    pub timeouts: u32,
}

/// Result of resuming the sequencer for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStep {
    /// No rebuild in flight
    Idle,
    /// Still suspended in the given phase
    Pending(SequencerPhase),
    /// The rebuild completed and the guard was released
    Finished(RebuildReport),
}

struct RebuildSequence {
    snapshot: Snapshot,
    phase: SequencerPhase,
    wait: TransitionWait,
    report: RebuildReport,
    _token: GuardToken,
}

impl RebuildSequence {
    fn advance<P: PresentationAdapter>(
        &mut self,
        policy: &TimeoutPolicy,
        store: &mut EntryStore<P::Handle>,
        presenter: &mut P,
    ) -> Result<Option<RebuildReport>> {
        match self.phase {
            SequencerPhase::ExitPlaying => {
                let playing = presenter.is_playing(TransitionTarget::Container);
                match self.wait.poll(playing, policy, "list exit") {
                    WaitStatus::Waiting => return Ok(None),
                    WaitStatus::TimedOut => self.report.timeouts += 1,
                    WaitStatus::Done => {}
                }

                self.phase = SequencerPhase::Mutating;
                info!("Forcing list rebuild with {} items", self.snapshot.len());
                let (removed, created) = rebuild(store, &self.snapshot, presenter)?;
                self.report.removed = removed;
                self.report.created = created;

                presenter.play_transition(TransitionTarget::Container, Transition::Enter)?;
                self.phase = SequencerPhase::EnterPlaying;
                self.wait = TransitionWait::default();
                Ok(None)
            }
            SequencerPhase::EnterPlaying => {
                let playing = presenter.is_playing(TransitionTarget::Container);
                match self.wait.poll(playing, policy, "list enter") {
                    WaitStatus::Waiting => return Ok(None),
                    WaitStatus::TimedOut => self.report.timeouts += 1,
                    WaitStatus::Done => {}
                }
                self.phase = SequencerPhase::Idle;
                Ok(Some(self.report))
            }
            SequencerPhase::Idle | SequencerPhase::Mutating => Ok(Some(self.report)),
        }
    }
}

/// Drives whole-list exit → rebuild → enter sequences
pub struct TransitionSequencer {
    policy: TimeoutPolicy,
    active: Option<RebuildSequence>,
}

impl Default for TransitionSequencer {
    fn default() -> Self {
        Self::new(TimeoutPolicy::default())
    }
}

impl TransitionSequencer {
    pub fn new(policy: TimeoutPolicy) -> Self {
        Self {
            policy,
            active: None,
        }
    }

    pub fn policy(&self) -> &TimeoutPolicy {
        &self.policy
    }

    pub fn phase(&self) -> SequencerPhase {
        self.active
            .as_ref()
            .map_or(SequencerPhase::Idle, |sequence| sequence.phase)
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Begin a rebuild towards `snapshot`: Idle → ExitPlaying.
    ///
    /// The sequence takes ownership of the cycle's guard token. If the exit transition
    /// cannot be started the token is dropped before the error is returned.
    pub fn start<P: PresentationAdapter>(
        &mut self,
        snapshot: Snapshot,
        token: GuardToken,
        presenter: &mut P,
    ) -> Result<()> {
        if self.abandon() {
            warn!("Replacing an unfinished rebuild sequence");
        }
        presenter.play_transition(TransitionTarget::Container, Transition::Exit)?;
        self.active = Some(RebuildSequence {
            snapshot,
            phase: SequencerPhase::ExitPlaying,
            wait: TransitionWait::default(),
            report: RebuildReport::default(),
            _token: token,
        });
        Ok(())
    }

    /// Resume the in-flight rebuild for one frame
    pub fn on_frame<P: PresentationAdapter>(
        &mut self,
        store: &mut EntryStore<P::Handle>,
        presenter: &mut P,
    ) -> Result<SequenceStep> {
        let Some(mut sequence) = self.active.take() else {
            return Ok(SequenceStep::Idle);
        };

        match sequence.advance(&self.policy, store, presenter) {
            Ok(None) => {
                let phase = sequence.phase;
                self.active = Some(sequence);
                Ok(SequenceStep::Pending(phase))
            }
            Ok(Some(report)) => {
                info!(
                    "List rebuild finished: {} removed, {} created",
                    report.removed, report.created
                );
                Ok(SequenceStep::Finished(report))
            }
            Err(err) => {
                error!(
                    "List rebuild aborted during {:?}, store left with {} entries: {}",
                    sequence.phase,
                    store.len(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Drop any in-flight sequence, releasing its guard. Returns whether one existed.
    pub fn abandon(&mut self) -> bool {
        self.active.take().is_some()
    }
}

/// Replace the whole store contents with `snapshot` under suspended layout.
///
/// Returns `(removed, created)`. Layout is resumed even when the rebuild fails.
pub(crate) fn rebuild<P: PresentationAdapter>(
    store: &mut EntryStore<P::Handle>,
    snapshot: &[Item],
    presenter: &mut P,
) -> Result<(usize, usize)> {
    presenter.set_layout_suspended(true)?;
    let outcome = tear_down(store, presenter)
        .and_then(|removed| populate(store, snapshot, presenter).map(|created| (removed, created)));
    let resumed = presenter.set_layout_suspended(false);
    let counts = outcome?;
    resumed?;
    Ok(counts)
}

/// Remove every entry from the store and the presentation.
///
/// An entry leaves the store only once the adapter has removed it, so a failed
/// removal stays addressable by the next cycle.
pub(crate) fn tear_down<P: PresentationAdapter>(
    store: &mut EntryStore<P::Handle>,
    presenter: &mut P,
) -> Result<usize> {
    let mut removed = 0;
    while let Some(entry) = store.last() {
        debug!("Tearing down entry '{}'", entry.id);
        presenter.remove_entry(entry.handle.clone())?;
        store.pop_last();
        removed += 1;
    }
    Ok(removed)
}

/// Create an entry for every unique snapshot item, in snapshot order
pub(crate) fn populate<P: PresentationAdapter>(
    store: &mut EntryStore<P::Handle>,
    snapshot: &[Item],
    presenter: &mut P,
) -> Result<usize> {
    let mut created = 0;
    for item in unique_items(snapshot) {
        debug!("Adding entry '{}': {}", item.id, item.display_text);
        let handle = presenter.create_entry(item)?;
        if let Some(stale) = store.upsert(item.id.clone(), item.display_text.clone(), handle) {
            presenter.remove_entry(stale)?;
        }
        created += 1;
    }
    Ok(created)
}
