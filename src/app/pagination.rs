//! Sequential page fetching for one directory session.
//!
//! The controller hands out [`PageRequest`]s for the worker and later accepts or
//! rejects their completions. Two rules keep the item list consistent:
//!
//! - **Mutual exclusion**: while a request is in flight, `load_next` returns
//!   `None`, so no two requests for the same session ever overlap and no offset
//!   is requested twice concurrently.
//! - **Staleness**: every request captures the session generation and directory
//!   it was issued for. A completion is accepted only if it is the request
//!   currently in flight for the current session; anything else is dropped.
//!
//! The generation is bumped on every session start, so leaving a directory and
//! coming straight back still rejects the first visit's late responses.

use super::store::ItemStore;
use crate::domain::{DirectoryKey, ListingPage};
use serde::{Deserialize, Serialize};

/// A page fetch the worker should perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Unique per controller, increasing.
    pub id: u64,
    /// Session generation the request belongs to.
    pub generation: u64,
    pub dir: DirectoryKey,
    pub offset: usize,
    pub recursive: bool,
}

/// Server-reported total item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Total {
    Unknown,
    Known(u64),
}

/// Position of the session in its listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub offset: usize,
    pub total: Total,
    /// Set once a page contributes no new items.
    pub exhausted: bool,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            offset: 0,
            total: Total::Unknown,
            exhausted: false,
        }
    }
}

impl PageCursor {
    #[must_use]
    pub fn has_more(&self) -> bool {
        if self.exhausted {
            return false;
        }
        match self.total {
            Total::Unknown => true,
            Total::Known(total) => (self.offset as u64) < total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    InFlight(PageRequest),
    Failed(String),
}

/// Result of handing a worker completion to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page belonged to the current session and was merged.
    Merged { added: usize, has_more: bool },
    /// The page belonged to an earlier session or an unknown request.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct PaginationController {
    dir: DirectoryKey,
    generation: u64,
    next_request_id: u64,
    recursive: bool,
    cursor: PageCursor,
    fetch: FetchState,
    responses: usize,
    degraded: bool,
}

impl PaginationController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new session for `dir`, invalidating every outstanding request.
    ///
    /// The caller resets the item store in the same step.
    pub fn begin(&mut self, dir: DirectoryKey, recursive: bool) {
        self.generation += 1;
        self.dir = dir;
        self.recursive = recursive;
        self.cursor = PageCursor::default();
        self.fetch = FetchState::Idle;
        self.responses = 0;
        self.degraded = false;

        tracing::debug!(dir = %self.dir, generation = self.generation, "pagination session started");
    }

    /// Issues the next page request, or `None` when a request is already in
    /// flight, nothing more is available, or `dir` is not the session directory.
    ///
    /// The offset is the number of items loaded so far. A `Failed` state does not
    /// block: calling again is how a failed page is retried.
    pub fn load_next(&mut self, dir: &DirectoryKey, loaded: usize) -> Option<PageRequest> {
        if dir != &self.dir {
            tracing::debug!(requested = %dir, current = %self.dir, "load_next for inactive directory");
            return None;
        }
        if matches!(self.fetch, FetchState::InFlight(_)) {
            tracing::trace!("page request already in flight");
            return None;
        }
        if !self.cursor.has_more() {
            tracing::trace!(offset = self.cursor.offset, "listing exhausted");
            return None;
        }

        self.next_request_id += 1;
        let request = PageRequest {
            id: self.next_request_id,
            generation: self.generation,
            dir: self.dir.clone(),
            offset: loaded,
            recursive: self.recursive,
        };

        tracing::debug!(
            request_id = request.id,
            dir = %request.dir,
            offset = request.offset,
            "page request issued"
        );

        self.fetch = FetchState::InFlight(request.clone());
        Some(request)
    }

    fn is_current(&self, request: &PageRequest) -> bool {
        request.generation == self.generation
            && request.dir == self.dir
            && matches!(&self.fetch, FetchState::InFlight(r) if r.id == request.id)
    }

    /// Accepts a successful page: updates the total, merges the items into
    /// `store` and returns to `Idle`.
    pub fn complete(&mut self, store: &mut ItemStore, request: &PageRequest, page: &ListingPage) -> PageOutcome {
        if !self.is_current(request) {
            tracing::debug!(
                request_id = request.id,
                request_dir = %request.dir,
                current_dir = %self.dir,
                "discarding stale page"
            );
            return PageOutcome::Stale;
        }

        self.update_total(page.total);

        let added = store.merge(page.items());
        self.cursor.offset = store.len();
        if added == 0 {
            self.cursor.exhausted = true;
        }
        self.fetch = FetchState::Idle;
        self.responses += 1;

        let has_more = self.cursor.has_more();
        tracing::debug!(
            request_id = request.id,
            added,
            loaded = self.cursor.offset,
            total = ?self.cursor.total,
            has_more,
            "page merged"
        );

        PageOutcome::Merged { added, has_more }
    }

    /// Records a failed page. Returns `false` when the failure is stale.
    pub fn fail(&mut self, request: &PageRequest, reason: &str) -> bool {
        if !self.is_current(request) {
            tracing::debug!(request_id = request.id, "discarding stale failure");
            return false;
        }

        tracing::warn!(request_id = request.id, offset = request.offset, reason, "page fetch failed");
        self.fetch = FetchState::Failed(reason.to_string());
        true
    }

    fn update_total(&mut self, reported: Option<u64>) {
        if self.degraded {
            return;
        }

        self.cursor.total = match (self.cursor.total, reported) {
            (_, None) if self.responses == 0 => Total::Unknown,
            (Total::Known(known), Some(total)) if total < known => {
                tracing::debug!(known, total, "server total shrank, falling back to unknown");
                self.degraded = true;
                Total::Unknown
            }
            (_, Some(total)) => Total::Known(total),
            (_, None) => {
                tracing::debug!("server omitted total, falling back to unknown");
                self.degraded = true;
                Total::Unknown
            }
        };
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.cursor.has_more()
    }

    #[must_use]
    pub const fn cursor(&self) -> PageCursor {
        self.cursor
    }

    #[must_use]
    pub const fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn dir(&self) -> &DirectoryKey {
        &self.dir
    }
}
