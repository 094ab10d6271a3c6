//! Reconciliation guard: at most one in-flight cycle per list.
//!
//! The guard is a two-state machine (`Idle`/`Busy`). The only way to move it to
//! `Busy` is [`ReconciliationGuard::try_acquire`], which returns a [`GuardToken`];
//! dropping the token is the only way back to `Idle`. Every exit path of a cycle,
//! including early returns on errors and an abandoned rebuild, therefore releases it.
//!
//! The guard uses `Rc<Cell<_>>` and is intentionally not `Clone`: it belongs to a
//! single list instance on a single thread.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    #[default]
    Idle,
    Busy,
}

#[derive(Debug, Default)]
pub struct ReconciliationGuard {
    state: Rc<Cell<GuardState>>,
}

impl ReconciliationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GuardState {
        self.state.get()
    }

    pub fn is_held(&self) -> bool {
        self.state() == GuardState::Busy
    }

    /// Move to `Busy` and return the token holding it, or `None` if already held
    pub fn try_acquire(&self) -> Option<GuardToken> {
        if self.is_held() {
            return None;
        }
        self.state.set(GuardState::Busy);
        Some(GuardToken {
            state: Rc::clone(&self.state),
        })
    }
}

/// Proof that the guard is held. Releases it when dropped.
#[must_use = "dropping the token releases the reconciliation guard immediately"]
#[derive(Debug)]
pub struct GuardToken {
    state: Rc<Cell<GuardState>>,
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.state.set(GuardState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_held() {
        let guard = ReconciliationGuard::new();
        assert_eq!(guard.state(), GuardState::Idle);

        let token = guard.try_acquire().expect("first acquire succeeds");
        assert!(guard.is_held());
        assert!(guard.try_acquire().is_none());

        drop(token);
        assert_eq!(guard.state(), GuardState::Idle);
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn token_released_on_error_path() {
        fn failing_cycle(guard: &ReconciliationGuard) -> Result<(), &'static str> {
            let _token = guard.try_acquire().ok_or("busy")?;
            Err("adapter blew up")
        }

        let guard = ReconciliationGuard::new();
        assert_eq!(failing_cycle(&guard), Err("adapter blew up"));
        assert!(!guard.is_held());
    }

    #[test]
    fn separate_guards_are_independent() {
        let first = ReconciliationGuard::new();
        let second = ReconciliationGuard::new();

        let _held = first.try_acquire().unwrap();
        assert!(first.is_held());
        assert!(!second.is_held());
        assert!(second.try_acquire().is_some());
    }
}
