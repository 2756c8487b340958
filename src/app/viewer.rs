//! Full-screen viewer lifecycle.
//!
//! ```text
//!            open / deep link / pop(src found)
//!   Closed ───────────────────────────────────▶ Open(i) ──change(j)──▶ Open(j)
//!     ▲  │                                        │
//!     │  │ pop(src not loaded yet)                │ close / pop(no src) / directory change
//!     │  ▼                                        ▼
//!     │ Pending(src) ──merge finds src──▶ Open(k)  Closed
//!     │  │
//!     └──┘ listing finished without src
//! ```
//!
//! The session never holds an index that does not resolve: `Open` is entered
//! only with a position found in the item store, and an unresolved request waits
//! in `Pending` until a merge produces the item or the listing runs out.
//!
//! Transitions return [`ViewerEffect`]s; the event handler turns them into
//! actions for the viewer widget, the page and the grid.

use super::store::ItemStore;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewerState {
    #[default]
    Closed,
    /// Open was requested for an item that is not loaded yet.
    Pending { src: String },
    Open { index: usize },
}

/// Which grid index to bring back into view when the viewer closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollRestore {
    /// The slide that was showing when the viewer closed.
    #[default]
    LastViewed,
    /// The slide the viewer was opened on.
    OpenedAt,
}

impl ScrollRestore {
    /// Parses `last_viewed` / `opened_at`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_viewed" => Some(Self::LastViewed),
            "opened_at" => Some(Self::OpenedAt),
            _ => None,
        }
    }
}

/// What closed the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The widget itself closed (close button, gesture). It needs no command.
    Widget,
    /// The location lost its `src` (history pop) or points nowhere.
    Location,
    /// The user left the directory. The old grid is gone, so nothing is
    /// scrolled.
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEffect {
    /// Show the widget at `index`.
    Open { index: usize },
    /// Move an already open widget to `index`.
    GoTo { index: usize },
    /// Tell the widget to close.
    Close,
    /// Take exclusive input: page scroll and text selection off.
    LockInput,
    UnlockInput,
    ScrollTo { index: usize },
}

#[derive(Debug, Clone, Default)]
pub struct ViewerSession {
    state: ViewerState,
    opened_at: usize,
    last_focused: usize,
    restore: ScrollRestore,
}

impl ViewerSession {
    #[must_use]
    pub fn new(restore: ScrollRestore) -> Self {
        Self {
            restore,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ViewerState {
        &self.state
    }

    #[must_use]
    pub const fn open_index(&self) -> Option<usize> {
        match self.state {
            ViewerState::Open { index } => Some(index),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, ViewerState::Open { .. })
    }

    /// Index of the last slide shown, kept after closing for scroll restoration.
    #[must_use]
    pub const fn last_focused(&self) -> usize {
        self.last_focused
    }

    #[must_use]
    pub const fn restore_index(&self) -> usize {
        match self.restore {
            ScrollRestore::LastViewed => self.last_focused,
            ScrollRestore::OpenedAt => self.opened_at,
        }
    }

    /// Opens at a resolved `index`, or moves the open widget there.
    pub fn open(&mut self, index: usize) -> Vec<ViewerEffect> {
        let effects = match self.state {
            ViewerState::Open { index: current } if current == index => vec![],
            ViewerState::Open { .. } => vec![ViewerEffect::GoTo { index }],
            ViewerState::Closed | ViewerState::Pending { .. } => {
                self.opened_at = index;
                vec![ViewerEffect::Open { index }, ViewerEffect::LockInput]
            }
        };

        self.last_focused = index;
        self.state = ViewerState::Open { index };
        effects
    }

    /// Records a slide change reported by the widget. Returns `false` when the
    /// viewer is not open or already shows `index`.
    pub fn change(&mut self, index: usize) -> bool {
        match self.state {
            ViewerState::Open { index: current } if current != index => {
                self.state = ViewerState::Open { index };
                self.last_focused = index;
                true
            }
            _ => false,
        }
    }

    /// Closes the viewer. A pending request is dropped without effects.
    pub fn close(&mut self, reason: CloseReason) -> Vec<ViewerEffect> {
        let was_open = self.is_open();
        self.state = ViewerState::Closed;

        if !was_open {
            return vec![];
        }

        let mut effects = Vec::with_capacity(3);
        if reason != CloseReason::Widget {
            effects.push(ViewerEffect::Close);
        }
        effects.push(ViewerEffect::UnlockInput);
        if reason != CloseReason::Directory {
            effects.push(ViewerEffect::ScrollTo {
                index: self.restore_index(),
            });
        }
        effects
    }

    /// Forgets everything about the previous directory.
    pub fn reset(&mut self) -> Vec<ViewerEffect> {
        let effects = self.close(CloseReason::Directory);
        self.opened_at = 0;
        self.last_focused = 0;
        effects
    }

    /// Brings the viewer in line with the location's `src`.
    ///
    /// - no `src`: close;
    /// - `src` found in `store`: open there (or move there);
    /// - `src` not loaded and more pages may come: wait in `Pending`;
    /// - `src` not loaded and the listing is complete: give up silently.
    pub fn reconcile(&mut self, src: Option<&str>, store: &ItemStore, has_more: bool) -> Vec<ViewerEffect> {
        let Some(src) = src else {
            return self.close(CloseReason::Location);
        };

        if let Some(index) = store.position(src) {
            return self.open(index);
        }

        let effects = self.close(CloseReason::Location);
        if has_more {
            tracing::debug!(src, "viewer waiting for item to load");
            self.state = ViewerState::Pending { src: src.to_string() };
        } else {
            tracing::debug!(src, "item not in listing, viewer stays closed");
        }
        effects
    }
}
