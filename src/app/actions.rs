//! Actions representing side effects to be executed by the runtime.
//!
//! The event handler never touches the network, the history stack, the viewer
//! widget or the disk. It returns a `Vec<Action>` after every event and the
//! runtime executes them in order. Order matters: a location write is always
//! emitted before the viewer command it belongs to.
//!
//! # Example
//!
//! ```rust
//! use galleria::app::Action;
//!
//! let actions = vec![
//!     Action::ReplaceLocation { src: None },
//!     Action::CloseViewer,
//!     Action::UnlockInput,
//!     Action::ScrollToIndex(3),
//! ];
//! assert_eq!(actions.len(), 4);
//! ```

use crate::domain::{DirectoryKey, Slide};
use crate::storage::DisplaySettings;
use crate::worker::WorkerMessage;

/// Commands executed by the runtime on behalf of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Posts a message to the background worker thread.
    PostToWorker(WorkerMessage),

    /// Adds a history entry whose `src` query parameter is `src`.
    ///
    /// Only emitted for an explicit open, so each open adds exactly one entry.
    PushLocation {
        src: Option<String>,
    },

    /// Rewrites the current history entry's `src` query parameter.
    ReplaceLocation {
        src: Option<String>,
    },

    /// Shows the full-screen viewer.
    OpenViewer {
        /// Slide to show first.
        index: usize,
        /// The viewer's whole data source, in item order.
        slides: Vec<Slide>,
        /// Zoom to fill the screen instead of fitting the slide.
        fill_screen: bool,
    },

    /// Moves the open viewer to another slide.
    ViewerGoTo {
        index: usize,
    },

    /// Replaces the open viewer's data source after more items were merged.
    SyncViewerSlides {
        slides: Vec<Slide>,
    },

    /// Closes the viewer widget.
    CloseViewer,

    /// Gives the viewer exclusive input: page scrolling and text selection off.
    LockInput,

    /// Restores page scrolling and text selection.
    UnlockInput,

    /// Scrolls the grid so that the tile at this index is visible.
    ScrollToIndex(usize),

    /// Persists the display preferences.
    SaveSettings(DisplaySettings),

    /// Leaves the gallery for the details page of one image.
    NavigateToDetails {
        src: String,
        dir: DirectoryKey,
        index: usize,
    },
}
