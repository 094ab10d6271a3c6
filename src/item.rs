//! Items and the source that produces them.
//!
//! An [`Item`] is one pre-formatted row of data. The core never formats or sorts items
//! itself; it consumes whatever ordered [`Snapshot`] the [`ItemSource`] hands it.

use crate::error::Result;
use log::warn;
use std::collections::HashSet;

/// One displayable unit of data, immutable for the lifetime of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    /// Stable key, derived from the underlying identity (e.g. product id)
    pub id: String,
    /// Fully formatted text; the unit of change detection
    pub display_text: String,
}

impl Item {
    pub fn new(id: impl Into<String>, display_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_text: display_text.into(),
        }
    }
}

/// The full ordered set of items for one tick
pub type Snapshot = Vec<Item>;

/// Source of truth queried once per honored tick.
///
/// Implementations must be side-effect free and return a fresh, already ordered
/// sequence on every call. Returning [`ListError::MissingDependency`] makes the driver
/// skip the tick and try again on the next one.
///
/// [`ListError::MissingDependency`]: crate::error::ListError::MissingDependency
pub trait ItemSource {
    fn snapshot(&self) -> Result<Snapshot>;
}

impl<F> ItemSource for F
where
    F: Fn() -> Result<Snapshot>,
{
    fn snapshot(&self) -> Result<Snapshot> {
        self()
    }
}

/// Items of `snapshot` in order with repeated ids dropped.
///
/// The first occurrence of an id wins; every later duplicate is logged and skipped so
/// no presentation handle is ever created for it.
pub(crate) fn unique_items(snapshot: &[Item]) -> Vec<&Item> {
    let mut seen = HashSet::with_capacity(snapshot.len());
    let mut unique = Vec::with_capacity(snapshot.len());
    for item in snapshot {
        if seen.insert(item.id.as_str()) {
            unique.push(item);
        } else {
            warn!(
                "Snapshot contains duplicate id '{}', ignoring '{}'",
                item.id, item.display_text
            );
        }
    }
    unique
}
