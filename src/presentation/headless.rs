//! In-memory presentation adapter.
//!
//! `HeadlessPresenter` keeps its rows in a plain vector, counts transition progress in
//! frames instead of wall time and journals every call it receives. It backs the
//! `--headless` mode of the binary and the test suites, which use its stall mode and
//! one-shot failure injection to exercise the timeout and abort paths.

use crate::error::{ListError, Result};
use crate::item::Item;
use crate::presentation::{PresentationAdapter, Transition, TransitionTarget};
use std::collections::{HashMap, HashSet};

/// Frames a transition stays playing unless configured otherwise
pub const DEFAULT_TRANSITION_FRAMES: u32 = 3;

/// Handle addressing one headless row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryHandle(u64);

impl EntryHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Adapter operations that can be made to fail on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresenterOp {
    CreateEntry,
    UpdateEntryText,
    RemoveEntry,
    PlayTransition,
}

impl PresenterOp {
    pub fn name(self) -> &'static str {
        match self {
            PresenterOp::CreateEntry => "create_entry",
            PresenterOp::UpdateEntryText => "update_entry_text",
            PresenterOp::RemoveEntry => "remove_entry",
            PresenterOp::PlayTransition => "play_transition",
        }
    }
}

/// Journal record of one successful adapter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    Created {
        handle: EntryHandle,
        id: String,
        text: String,
    },
    Updated {
        handle: EntryHandle,
        text: String,
    },
    Removed {
        handle: EntryHandle,
    },
    ContainerTransition(Transition),
    EntryTransition {
        handle: EntryHandle,
        transition: Transition,
    },
    LayoutSuspended(bool),
}

/// One visible row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub handle: EntryHandle,
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
struct Playback {
    transition: Transition,
    remaining: u32,
}

#[derive(Debug)]
pub struct HeadlessPresenter {
    next_handle: u64,
    rows: Vec<Row>,
    container: Option<Playback>,
    entry_playback: HashMap<EntryHandle, Playback>,
    transition_frames: u32,
    stalled: bool,
    ready: bool,
    layout_suspended: bool,
    pending_failures: HashSet<PresenterOp>,
    journal: Vec<PresenterEvent>,
    frame: u64,
    rendered: Vec<Row>,
}

impl Default for HeadlessPresenter {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSITION_FRAMES)
    }
}

impl HeadlessPresenter {
    /// Create a presenter whose transitions last `transition_frames` frames.
    /// Zero makes every transition finish as soon as it starts.
    pub fn new(transition_frames: u32) -> Self {
        Self {
            next_handle: 0,
            rows: Vec::new(),
            container: None,
            entry_playback: HashMap::new(),
            transition_frames,
            stalled: false,
            ready: true,
            layout_suspended: false,
            pending_failures: HashSet::new(),
            journal: Vec::new(),
            frame: 0,
            rendered: Vec::new(),
        }
    }

    /// Advance every playing transition by one frame
    pub fn advance_frame(&mut self) {
        self.frame += 1;
        if self.stalled {
            return;
        }
        if let Some(playback) = self.container.as_mut() {
            playback.remaining = playback.remaining.saturating_sub(1);
        }
        if self.container.is_some_and(|playback| playback.remaining == 0) {
            self.container = None;
        }
        for playback in self.entry_playback.values_mut() {
            playback.remaining = playback.remaining.saturating_sub(1);
        }
        self.entry_playback.retain(|_, playback| playback.remaining > 0);
    }

    /// Never let a transition finish (simulates an adapter that stops reporting)
    pub fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Make the next call of `op` fail with an adapter error
    pub fn fail_next(&mut self, op: PresenterOp) {
        self.pending_failures.insert(op);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// `(id, text)` of each visible row in order
    pub fn visible(&self) -> Vec<(&str, &str)> {
        self.rows
            .iter()
            .map(|row| (row.id.as_str(), row.text.as_str()))
            .collect()
    }

    pub fn journal(&self) -> &[PresenterEvent] {
        &self.journal
    }

    pub fn take_journal(&mut self) -> Vec<PresenterEvent> {
        std::mem::take(&mut self.journal)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn layout_suspended(&self) -> bool {
        self.layout_suspended
    }

    /// Transition currently playing on the container, if any
    pub fn container_transition(&self) -> Option<Transition> {
        self.container
            .filter(|playback| self.stalled || playback.remaining > 0)
            .map(|playback| playback.transition)
    }

    /// Rows formatted as `id=text, ...` if they changed since the last call
    pub fn take_changed_rows(&mut self) -> Option<String> {
        if self.rows == self.rendered {
            return None;
        }
        self.rendered.clone_from(&self.rows);
        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|row| format!("{}={}", row.id, row.text))
            .collect();
        Some(rows.join(", "))
    }

    fn check(&mut self, op: PresenterOp) -> Result<()> {
        if self.pending_failures.remove(&op) {
            return Err(ListError::adapter(op.name(), "injected failure"));
        }
        Ok(())
    }

    fn row_index(&self, handle: EntryHandle, op: PresenterOp) -> Result<usize> {
        self.rows
            .iter()
            .position(|row| row.handle == handle)
            .ok_or_else(|| {
                ListError::adapter(op.name(), format!("unknown handle {}", handle.raw()))
            })
    }
}

impl PresentationAdapter for HeadlessPresenter {
    type Handle = EntryHandle;

    fn create_entry(&mut self, item: &Item) -> Result<EntryHandle> {
        self.check(PresenterOp::CreateEntry)?;
        let handle = EntryHandle(self.next_handle);
        self.next_handle += 1;
        self.rows.push(Row {
            handle,
            id: item.id.clone(),
            text: item.display_text.clone(),
        });
        self.journal.push(PresenterEvent::Created {
            handle,
            id: item.id.clone(),
            text: item.display_text.clone(),
        });
        Ok(handle)
    }

    fn update_entry_text(&mut self, handle: &EntryHandle, text: &str) -> Result<()> {
        self.check(PresenterOp::UpdateEntryText)?;
        let index = self.row_index(*handle, PresenterOp::UpdateEntryText)?;
        self.rows[index].text = text.to_string();
        self.journal.push(PresenterEvent::Updated {
            handle: *handle,
            text: text.to_string(),
        });
        Ok(())
    }

    fn remove_entry(&mut self, handle: EntryHandle) -> Result<()> {
        self.check(PresenterOp::RemoveEntry)?;
        let index = self.row_index(handle, PresenterOp::RemoveEntry)?;
        self.rows.remove(index);
        self.entry_playback.remove(&handle);
        self.journal.push(PresenterEvent::Removed { handle });
        Ok(())
    }

    fn play_transition(
        &mut self,
        target: TransitionTarget<'_, EntryHandle>,
        transition: Transition,
    ) -> Result<()> {
        self.check(PresenterOp::PlayTransition)?;
        let playback = Playback {
            transition,
            remaining: self.transition_frames,
        };
        match target {
            TransitionTarget::Container => {
                self.container = Some(playback);
                self.journal
                    .push(PresenterEvent::ContainerTransition(transition));
            }
            TransitionTarget::Entry(handle) => {
                self.row_index(*handle, PresenterOp::PlayTransition)?;
                self.entry_playback.insert(*handle, playback);
                self.journal.push(PresenterEvent::EntryTransition {
                    handle: *handle,
                    transition,
                });
            }
        }
        Ok(())
    }

    fn is_playing(&self, target: TransitionTarget<'_, EntryHandle>) -> bool {
        let playback = match target {
            TransitionTarget::Container => self.container,
            TransitionTarget::Entry(handle) => self.entry_playback.get(handle).copied(),
        };
        playback.is_some_and(|playback| self.stalled || playback.remaining > 0)
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn set_layout_suspended(&mut self, suspended: bool) -> Result<()> {
        self.layout_suspended = suspended;
        self.journal.push(PresenterEvent::LayoutSuspended(suspended));
        Ok(())
    }
}
