//! Storage layer for persisted display preferences.
//!
//! Preferences (thumbnail size, fill-screen zoom, recursive listing) are loaded
//! once at startup and saved whenever the user changes them. The engine treats
//! them as inputs; only the runtime talks to the store.
//!
//! # Modules
//!
//! - `backend`: Storage trait abstraction for backend implementations
//! - `json`: JSON file-based implementation with atomic writes
//! - `models`: Persisted record types

pub mod backend;
pub mod json;
pub mod models;

pub use backend::SettingsStore;
pub use json::JsonSettingsStore;
pub use models::{DisplaySettings, SettingsRecord};
