//! User interface layer.
//!
//! ```text
//! AppState → compute_viewmodel → GridViewModel → render → text
//! ```
//!
//! - [`viewmodel`]: Display-ready types computed from the application state
//! - [`renderer`]: Plain-text rendering of a view model

pub mod renderer;
pub mod viewmodel;

pub use renderer::{render, render_to_string};
pub use viewmodel::{FetchStatus, GridViewModel, Tile, ViewerInfo};
