//! Application layer: the listing and viewer-synchronization engine.
//!
//! This layer sits between the runtime (main.rs) and the domain/worker layers.
//! It owns no I/O: events go in, state changes, actions come out.
//!
//! ```text
//! Router / Grid / Viewer → Events → handle_event → State → Actions → Runtime
//!                                        ↑                              ↓
//!                                        └────── Worker Responses ──────┘
//! ```
//!
//! # Modules
//!
//! - [`store`]: Ordered, deduplicated item list
//! - [`pagination`]: Sequential page fetching with staleness rejection
//! - [`navigation`]: Mirror of the location's `src` parameter, push vs replace
//! - [`viewer`]: Full-screen viewer lifecycle
//! - [`state`]: Session-scoped state container and view model computation
//! - [`handler`]: Event processing and state transition coordinator
//! - [`actions`]: Side effect commands emitted by the event handler

pub mod actions;
pub mod handler;
pub mod navigation;
pub mod pagination;
pub mod state;
pub mod store;
pub mod viewer;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use state::{AppState, DetailsView, DirectorySession, EngineOptions};
pub use viewer::ScrollRestore;
