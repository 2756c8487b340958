//! Storage backend abstraction.
//!
//! This module defines the [`SettingsStore`] trait over the places display
//! preferences can live. The engine never touches it: it only emits
//! `SaveSettings` actions, and the runtime owns the store.

use crate::domain::error::Result;
use crate::storage::models::DisplaySettings;

/// Persistence for [`DisplaySettings`].
///
/// # Implementations
///
/// - [`JsonSettingsStore`](crate::storage::JsonSettingsStore): JSON file with
///   atomic writes (default)
///
/// # Examples
///
/// ```no_run
/// use galleria::storage::{DisplaySettings, JsonSettingsStore, SettingsStore};
/// use std::path::PathBuf;
///
/// let mut store = JsonSettingsStore::new(PathBuf::from("/tmp/settings.json"))?;
/// let mut settings = store.load()?;
/// settings.fill_screen = true;
/// store.save(&settings)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait SettingsStore: Send {
    /// Returns the stored settings, or the defaults when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self) -> Result<DisplaySettings>;

    /// Replaces the stored settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn save(&mut self, settings: &DisplaySettings) -> Result<()>;
}
