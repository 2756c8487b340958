//! Bridge between the open viewer item and the browser location.
//!
//! The `src` query parameter of the current location says whether the viewer
//! should be open and on which item. The bridge mirrors that value and decides
//! how the engine's own changes are written back:
//!
//! - an explicit open **pushes** one new history entry;
//! - advancing between slides and closing **replace** the current entry, so the
//!   back button returns to the page as it was before the open instead of
//!   walking through every slide that was visited.
//!
//! Changes that come *from* the history stack (back/forward pops, directory
//! navigation) are adopted through [`NavigationBridge::on_pop`] and
//! [`NavigationBridge::on_navigate`], which never produce a write. A state
//! change driven by history must not write history.

use serde::{Deserialize, Serialize};

/// How a location change is recorded in the history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryMode {
    Push,
    Replace,
}

/// A location update for the history adapter to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationWrite {
    pub src: Option<String>,
    pub mode: HistoryMode,
}

#[derive(Debug, Clone, Default)]
pub struct NavigationBridge {
    src: Option<String>,
}

impl NavigationBridge {
    #[must_use]
    pub fn new(src: Option<String>) -> Self {
        Self { src }
    }

    #[must_use]
    pub fn current_src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    /// Records an engine-initiated location change and returns the write the
    /// history adapter has to perform.
    ///
    /// A replace that would not change anything is skipped and yields `None`.
    /// Pushes are always written since each one is an explicit user open.
    pub fn set_src(&mut self, src: Option<String>, mode: HistoryMode) -> Option<LocationWrite> {
        if mode == HistoryMode::Replace && src == self.src {
            tracing::trace!(src = ?src, "location unchanged, skipping replace");
            return None;
        }

        tracing::debug!(src = ?src, mode = ?mode, "writing location");
        self.src.clone_from(&src);
        Some(LocationWrite { src, mode })
    }

    /// Adopts the `src` of a location reached through back/forward.
    ///
    /// Returns `true` when the value changed.
    pub fn on_pop(&mut self, src: Option<String>) -> bool {
        let changed = self.src != src;
        tracing::debug!(src = ?src, changed, "location popped");
        self.src = src;
        changed
    }

    /// Adopts the `src` of a location reached through directory navigation.
    pub fn on_navigate(&mut self, src: Option<String>) {
        tracing::debug!(src = ?src, "location navigated");
        self.src = src;
    }
}
