//! Application state and view model computation.
//!
//! [`AppState`] is the single owner of everything the engine knows: the
//! current [`DirectorySession`] (items, pagination, folders), the viewer
//! lifecycle, the mirrored location and the display preferences. It is mutated
//! only by [`handle_event`](crate::app::handle_event); renderers read it through
//! [`AppState::compute_viewmodel`].
//!
//! # Example
//!
//! ```rust
//! use galleria::app::{AppState, EngineOptions};
//! use galleria::storage::DisplaySettings;
//!
//! let state = AppState::new(DisplaySettings::default(), EngineOptions::default(), None);
//! let vm = state.compute_viewmodel();
//! assert!(vm.tiles.is_empty());
//! ```

use super::navigation::NavigationBridge;
use super::pagination::{FetchState, PageOutcome, PageRequest, PaginationController};
use super::store::ItemStore;
use super::viewer::{ScrollRestore, ViewerSession, ViewerState};
use crate::domain::listing::DEFAULT_THUMBNAIL_SIZE;
use crate::domain::{DirectoryKey, Folder, ListingPage, Slide};
use crate::storage::DisplaySettings;
use crate::ui::viewmodel::{
    CrumbView, DetailsInfo, EmptyState, FetchStatus, FolderTile, FooterInfo, GridViewModel, HeaderInfo, Tile,
    ViewerInfo,
};

/// Engine behaviour switches taken from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Keep fetching pages while a deep-linked item is not loaded yet.
    pub deep_link_autoload: bool,

    /// Which grid index to scroll to when the viewer closes.
    pub scroll_restore: ScrollRestore,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            deep_link_autoload: true,
            scroll_restore: ScrollRestore::LastViewed,
        }
    }
}

/// State of the details page for one image.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailsView {
    Loading { path: String },
    Loaded { path: String, details: serde_json::Value },
    Failed { path: String, reason: String },
}

impl DetailsView {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Loading { path } | Self::Loaded { path, .. } | Self::Failed { path, .. } => path,
        }
    }
}

/// Everything tied to the directory being browsed.
///
/// The pagination controller outlives individual sessions so its generation
/// counter keeps growing; the items, folders and thumbnail aspect are dropped
/// on every [`DirectorySession::begin`].
#[derive(Debug, Clone)]
pub struct DirectorySession {
    store: ItemStore,
    pagination: PaginationController,
    folders: Vec<Folder>,
    thumbnail_size: (f64, f64),
}

impl Default for DirectorySession {
    fn default() -> Self {
        Self {
            store: ItemStore::new(),
            pagination: PaginationController::new(),
            folders: Vec::new(),
            thumbnail_size: (DEFAULT_THUMBNAIL_SIZE, DEFAULT_THUMBNAIL_SIZE),
        }
    }
}

impl DirectorySession {
    /// Starts browsing `dir`. Everything loaded for the previous session is
    /// dropped before this returns.
    pub fn begin(&mut self, dir: DirectoryKey, recursive: bool) {
        self.store.reset();
        self.folders.clear();
        self.thumbnail_size = (DEFAULT_THUMBNAIL_SIZE, DEFAULT_THUMBNAIL_SIZE);
        self.pagination.begin(dir, recursive);
    }

    /// Whether any session was started yet.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.pagination.generation() > 0
    }

    #[must_use]
    pub const fn dir(&self) -> &DirectoryKey {
        self.pagination.dir()
    }

    #[must_use]
    pub const fn store(&self) -> &ItemStore {
        &self.store
    }

    #[must_use]
    pub const fn pagination(&self) -> &PaginationController {
        &self.pagination
    }

    #[must_use]
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    #[must_use]
    pub const fn thumbnail_size(&self) -> (f64, f64) {
        self.thumbnail_size
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.pagination.has_more()
    }

    pub fn load_next(&mut self, dir: &DirectoryKey) -> Option<PageRequest> {
        self.pagination.load_next(dir, self.store.len())
    }

    /// Hands a fetched page to the pagination controller. Folders and the
    /// thumbnail aspect are taken from the page only when it was accepted.
    pub fn complete(&mut self, request: &PageRequest, page: &ListingPage) -> PageOutcome {
        let outcome = self.pagination.complete(&mut self.store, request, page);

        if let PageOutcome::Merged { .. } = outcome {
            if let Some(folders) = &page.folders {
                self.folders.clone_from(folders);
            }
            self.thumbnail_size = page.thumbnail_size();
        }

        outcome
    }

    pub fn fail(&mut self, request: &PageRequest, reason: &str) -> bool {
        self.pagination.fail(request, reason)
    }

    /// The viewer's data source: one slide per loaded item, in item order.
    #[must_use]
    pub fn slides(&self) -> Vec<Slide> {
        self.store.items().iter().map(crate::domain::Item::to_slide).collect()
    }
}

/// Central application state container.
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: DisplaySettings,
    pub options: EngineOptions,

    /// Mirror of the location's `src` query parameter.
    pub location: NavigationBridge,

    pub session: DirectorySession,
    pub viewer: ViewerSession,

    /// Set while the details page of an image is shown.
    pub details: Option<DetailsView>,
}

impl AppState {
    /// Creates the state for a freshly mounted gallery.
    ///
    /// `src` is the location's query parameter at mount time. It is only
    /// mirrored here; the first `DirectoryChanged` event starts the session and
    /// resolves it.
    #[must_use]
    pub fn new(settings: DisplaySettings, options: EngineOptions, src: Option<String>) -> Self {
        Self {
            settings,
            options,
            location: NavigationBridge::new(src),
            session: DirectorySession::default(),
            viewer: ViewerSession::new(options.scroll_restore),
            details: None,
        }
    }

    /// Computes the grid view model from the current state.
    #[must_use]
    pub fn compute_viewmodel(&self) -> GridViewModel {
        let store = self.session.store();
        let open_index = self.viewer.open_index();

        let tiles: Vec<Tile> = store
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| Tile {
                index,
                name: item.name.clone(),
                src: item.tile_src().to_string(),
                is_open: open_index == Some(index),
            })
            .collect();

        let folders: Vec<FolderTile> = self
            .session
            .folders()
            .iter()
            .map(|folder| FolderTile {
                name: folder.name.clone(),
                path: folder.path.clone(),
            })
            .collect();

        let dir = self.session.dir();
        let crumbs: Vec<CrumbView> = dir
            .crumbs()
            .into_iter()
            .map(|crumb| CrumbView {
                is_current: &crumb.path == dir,
                label: crumb.label,
                path: crumb.path.as_str().to_string(),
            })
            .collect();

        let has_more = self.session.has_more();
        let fetch_status = match self.session.pagination().fetch_state() {
            FetchState::InFlight(_) => FetchStatus::Loading,
            FetchState::Failed(reason) => FetchStatus::Failed(reason.clone()),
            FetchState::Idle if has_more => FetchStatus::Idle,
            FetchState::Idle => FetchStatus::Complete,
        };

        let viewer = match self.viewer.state() {
            ViewerState::Closed => None,
            ViewerState::Pending { src } => Some(ViewerInfo::Pending { src: src.clone() }),
            ViewerState::Open { index } => store.get(*index).map(|item| ViewerInfo::Open {
                index: *index,
                count: store.len(),
                name: item.name.clone(),
            }),
        };

        let empty_state = (tiles.is_empty() && folders.is_empty() && fetch_status == FetchStatus::Complete)
            .then(|| EmptyState {
                message: "No images".to_string(),
                subtitle: format!("{dir} has no files or folders"),
            });

        GridViewModel {
            header: self.compute_header(),
            crumbs,
            folders,
            tiles,
            tile_size: self.tile_size(),
            has_more,
            fetch_status,
            viewer,
            details: self.details.as_ref().map(DetailsInfo::from),
            empty_state,
            footer: self.compute_footer(),
        }
    }

    fn compute_header(&self) -> HeaderInfo {
        let loaded = self.session.store().len();
        let count = match self.session.pagination().cursor().total {
            super::pagination::Total::Known(total) => format!("{loaded} of {total}"),
            super::pagination::Total::Unknown => loaded.to_string(),
        };
        HeaderInfo {
            title: format!(" {} ({count}) ", self.session.dir()),
        }
    }

    fn compute_footer(&self) -> FooterInfo {
        let keybindings = if self.viewer.is_open() {
            "next/prev: navigate  info: details  close: close viewer  back: history back"
        } else {
            "open <n>: view  cd <dir>: browse  more: load more  set <key> <value>  quit"
        };
        FooterInfo {
            keybindings: keybindings.to_string(),
        }
    }

    /// Tile width comes from the preferences; the height keeps the aspect the
    /// server reported for its thumbnails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn tile_size(&self) -> (u32, u32) {
        let width = self.settings.thumbnail_size;
        let (thumb_w, thumb_h) = self.session.thumbnail_size();
        let height = (f64::from(width) * thumb_h / thumb_w).round().max(1.0) as u32;
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WireItem;

    fn page(srcs: &[&str]) -> ListingPage {
        ListingPage {
            folders: Some(vec![Folder {
                name: "sub".to_string(),
                path: "ns/sub".to_string(),
            }]),
            files: Some(
                srcs.iter()
                    .map(|src| WireItem {
                        src: Some((*src).to_string()),
                        ..WireItem::default()
                    })
                    .collect(),
            ),
            total: Some(srcs.len() as u64),
            thumbnail_width: Some(400.0),
            thumbnail_height: Some(300.0),
        }
    }

    #[test]
    fn stale_pages_do_not_touch_folders() {
        let mut session = DirectorySession::default();
        let dir = DirectoryKey::new("ns");
        session.begin(dir.clone(), false);
        let old = session.load_next(&dir).unwrap();

        session.begin(DirectoryKey::new("other"), false);
        assert_eq!(session.complete(&old, &page(&["/a.png"])), PageOutcome::Stale);
        assert!(session.folders().is_empty());
        assert_eq!(session.thumbnail_size(), (DEFAULT_THUMBNAIL_SIZE, DEFAULT_THUMBNAIL_SIZE));
    }

    #[test]
    fn viewmodel_reflects_loaded_page() {
        let mut state = AppState::new(DisplaySettings::default(), EngineOptions::default(), None);
        let dir = DirectoryKey::new("ns");
        state.session.begin(dir.clone(), false);

        let loading = state.compute_viewmodel();
        assert_eq!(loading.fetch_status, FetchStatus::Idle);

        let request = state.session.load_next(&dir).unwrap();
        assert_eq!(state.compute_viewmodel().fetch_status, FetchStatus::Loading);

        state.session.complete(&request, &page(&["/img/a.png", "/img/b.png"]));
        let vm = state.compute_viewmodel();

        assert_eq!(vm.tiles.len(), 2);
        assert_eq!(vm.tiles[1].name, "b.png");
        assert_eq!(vm.folders[0].path, "ns/sub");
        assert_eq!(vm.fetch_status, FetchStatus::Complete);
        assert_eq!(vm.tile_size, (180, 135));
        assert_eq!(vm.header.title, " ns (2 of 2) ");
        assert_eq!(vm.crumbs.len(), 2);
        assert!(vm.crumbs[1].is_current);
        assert!(vm.empty_state.is_none());
    }

    #[test]
    fn finished_empty_directory_shows_empty_state() {
        let mut state = AppState::new(DisplaySettings::default(), EngineOptions::default(), None);
        let dir = DirectoryKey::root();
        state.session.begin(dir.clone(), false);
        let request = state.session.load_next(&dir).unwrap();
        state.session.complete(&request, &ListingPage::default());

        let vm = state.compute_viewmodel();
        assert!(vm.empty_state.is_some());
        assert!(!vm.has_more);
    }
}
