//! # listsync - Keyed List Reconciliation Engine
//!
//! Keeps an on-screen list of keyed entries in sync with a periodically refreshed
//! snapshot. Text-only changes are patched in place; any structural change plays a
//! whole-list exit transition, rebuilds the entries and plays an enter transition.
//! At most one reconciliation cycle is ever in flight per list.
//!
//! ## Architecture
//!
//! - [`item`] - Items and the `ItemSource` collaborator trait
//! - [`presentation`] - The `PresentationAdapter` collaborator trait and a headless adapter
//! - [`store`] - Ordered `id -> Entry` store
//! - [`reconcile`] - Pure diff of store vs. snapshot selecting the patch strategy
//! - [`guard`] - Scoped single-flight reconciliation guard
//! - [`sequencer`] - Exit → rebuild → enter state machine with bounded waits
//! - [`swap`] - Optional animated per-entry text swaps
//! - [`driver`] - Tick/frame entry point tying the pieces together
//! - [`deals`], [`render`], [`app`] - Demo item source, terminal presenter and host loop

// Core modules
pub mod error;
pub mod guard;
pub mod item;
pub mod presentation;
pub mod reconcile;
pub mod sequencer;
pub mod store;
pub mod swap;

// Entry point for hosts
pub mod config;
pub mod driver;

// Reference collaborators and host
pub mod app;
pub mod deals;
pub mod render;

// Re-export commonly used types for convenience
pub use error::{ListError, Result};

// Public API surface for external usage
pub use app::Application;
pub use config::Settings;
pub use driver::{DriverStats, FrameOutcome, RefreshDriver, TickOutcome};
pub use guard::{GuardToken, ReconciliationGuard};
pub use item::{Item, ItemSource, Snapshot};
pub use presentation::{PresentationAdapter, Transition, TransitionTarget};
pub use reconcile::{reconcile, Decision};
pub use sequencer::{SequencerPhase, TimeoutPolicy};
pub use store::{Entry, EntryStore};
pub use swap::TextSwapStyle;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
