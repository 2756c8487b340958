//! Infrastructure layer for filesystem and location handling.
//!
//! - [`paths`]: Data directory and the files kept in it
//! - [`history`]: In-memory session history over gallery URLs

pub mod history;
pub mod paths;

pub use history::MemoryHistory;
pub use paths::{expand_tilde, get_data_dir};
