//! View model types representing renderable gallery state.
//!
//! View models are created via `AppState::compute_viewmodel()` and consumed by
//! the renderer. They contain no business logic, only display-ready data.
//!
//! # Example
//!
//! ```rust
//! use galleria::ui::viewmodel::{FetchStatus, FooterInfo, GridViewModel, HeaderInfo, Tile};
//!
//! let vm = GridViewModel {
//!     header: HeaderInfo { title: " / (1) ".to_string() },
//!     crumbs: vec![],
//!     folders: vec![],
//!     tiles: vec![Tile {
//!         index: 0,
//!         name: "a.png".to_string(),
//!         src: "/thumb/a.png".to_string(),
//!         is_open: false,
//!     }],
//!     tile_size: (180, 180),
//!     has_more: false,
//!     fetch_status: FetchStatus::Complete,
//!     viewer: None,
//!     details: None,
//!     empty_state: None,
//!     footer: FooterInfo { keybindings: "quit".to_string() },
//! };
//! assert_eq!(vm.tiles.len(), 1);
//! ```

use crate::app::state::DetailsView;

/// Complete gallery view model for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct GridViewModel {
    pub header: HeaderInfo,

    /// Breadcrumb trail, root first.
    pub crumbs: Vec<CrumbView>,

    /// Sub-directories of the current listing.
    pub folders: Vec<FolderTile>,

    /// One tile per loaded item, in item order.
    pub tiles: Vec<Tile>,

    /// Tile `(width, height)` in pixels.
    pub tile_size: (u32, u32),

    /// Whether scrolling to the end would load another page.
    pub has_more: bool,

    pub fetch_status: FetchStatus,

    /// Set while the viewer is open or waiting for its item.
    pub viewer: Option<ViewerInfo>,

    pub details: Option<DetailsInfo>,

    /// Shown when the listing finished without files or folders.
    pub empty_state: Option<EmptyState>,

    pub footer: FooterInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrumbView {
    pub label: String,
    pub path: String,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderTile {
    pub name: String,
    pub path: String,
}

/// One grid tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    pub name: String,
    /// Thumbnail source, or the image itself when there is none.
    pub src: String,
    /// Whether the viewer currently shows this item.
    pub is_open: bool,
}

/// Progress of the listing, as shown below the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// More pages exist; none is being fetched.
    Idle,
    Loading,
    /// The last page fetch failed; loading more retries it.
    Failed(String),
    /// Every page has been loaded.
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerInfo {
    Open { index: usize, count: usize, name: String },
    /// A linked item is still being searched for.
    Pending { src: String },
}

/// Details page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsInfo {
    pub path: String,
    /// `key: value` lines, or a single status line while loading or failed.
    pub lines: Vec<String>,
}

impl From<&DetailsView> for DetailsInfo {
    fn from(view: &DetailsView) -> Self {
        let lines = match view {
            DetailsView::Loading { .. } => vec!["loading...".to_string()],
            DetailsView::Failed { reason, .. } => vec![format!("failed: {reason}")],
            DetailsView::Loaded { details, .. } => match details {
                serde_json::Value::Object(fields) => fields
                    .iter()
                    .map(|(key, value)| match value {
                        serde_json::Value::String(s) => format!("{key}: {s}"),
                        other => format!("{key}: {other}"),
                    })
                    .collect(),
                other => vec![other.to_string()],
            },
        };

        Self {
            path: view.path().to_string(),
            lines,
        }
    }
}

/// Empty state message display information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: String,
    pub subtitle: String,
}

/// Footer display information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterInfo {
    /// Command help text.
    pub keybindings: String,
}
