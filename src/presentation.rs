//! Presentation adapter contract.
//!
//! The adapter owns the actual visual widgets. The core addresses entries only through
//! the adapter's opaque `Handle` type and learns that a transition finished by polling
//! [`PresentationAdapter::is_playing`] once per frame.

pub mod headless;

use crate::error::Result;
use crate::item::Item;

pub use headless::{EntryHandle, HeadlessPresenter, PresenterEvent, PresenterOp};

/// Named transition played on the container or on one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Exit,
    Enter,
}

impl Transition {
    pub fn name(self) -> &'static str {
        match self {
            Transition::Exit => "exit",
            Transition::Enter => "enter",
        }
    }
}

/// What a transition is played on
#[derive(Debug)]
pub enum TransitionTarget<'a, H> {
    /// The whole list container
    Container,
    /// A single entry
    Entry(&'a H),
}

impl<H> Clone for TransitionTarget<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for TransitionTarget<'_, H> {}

/// Core trait for the visual side of the list
pub trait PresentationAdapter {
    /// Opaque reference to one visual entry
    type Handle: Clone;

    /// Create a visual entry for `item` at the end of the container
    fn create_entry(&mut self, item: &Item) -> Result<Self::Handle>;

    /// Replace the text shown by an existing entry
    fn update_entry_text(&mut self, handle: &Self::Handle, text: &str) -> Result<()>;

    /// Tear an entry down and release its visual resources
    fn remove_entry(&mut self, handle: Self::Handle) -> Result<()>;

    /// Start playing `transition` on `target`
    fn play_transition(
        &mut self,
        target: TransitionTarget<'_, Self::Handle>,
        transition: Transition,
    ) -> Result<()>;

    /// Whether a transition is still playing on `target`
    fn is_playing(&self, target: TransitionTarget<'_, Self::Handle>) -> bool;

    /// Whether the adapter can accept calls yet. Ticks are deferred until it can.
    fn is_ready(&self) -> bool {
        true
    }

    /// Pause (or resume) layout recalculation while the list is rebuilt wholesale
    fn set_layout_suspended(&mut self, _suspended: bool) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_names() {
        assert_eq!(Transition::Exit.name(), "exit");
        assert_eq!(Transition::Enter.name(), "enter");
    }

    #[test]
    fn targets_are_copy_for_any_handle() {
        struct NotCopy;
        let handle = NotCopy;
        let target = TransitionTarget::Entry(&handle);
        let copy = target;
        assert!(matches!(target, TransitionTarget::Entry(_)));
        assert!(matches!(copy, TransitionTarget::Entry(_)));
    }
}
