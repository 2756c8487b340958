//! JSON file-based settings store.
//!
//! Preferences live in a small human-readable JSON file. Writes go to a temporary
//! file that is then renamed over the target, so a crash never leaves a
//! half-written file behind.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "saved_at": 1760000000,
//!   "settings": {
//!     "thumbnail_size": 180,
//!     "fill_screen": false,
//!     "files_recursive": false
//!   }
//! }
//! ```

use crate::domain::error::{GalleryError, Result};
use crate::storage::backend::SettingsStore;
use crate::storage::models::{DisplaySettings, SettingsRecord};
use std::path::{Path, PathBuf};

/// JSON file settings store.
///
/// The record is kept in memory and persisted on every change.
pub struct JsonSettingsStore {
    file_path: PathBuf,
    record: SettingsRecord,
    dirty: bool,
}

impl JsonSettingsStore {
    /// Opens the store, loading the file if it exists.
    ///
    /// A file that cannot be parsed is logged and replaced by defaults on the
    /// next save; preferences are not worth refusing to start over.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the file
    /// exists but cannot be read.
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing settings store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let record = if file_path.exists() {
            match Self::load_from_file(&file_path) {
                Ok(record) => record,
                Err(GalleryError::Storage(reason)) => {
                    tracing::warn!(path = ?file_path, reason, "unreadable settings file, using defaults");
                    SettingsRecord::default()
                }
                Err(e) => return Err(e),
            }
        } else {
            SettingsRecord::default()
        };

        Ok(Self {
            file_path,
            record,
            dirty: false,
        })
    }

    fn load_from_file(path: &Path) -> Result<SettingsRecord> {
        let contents = std::fs::read_to_string(path)?;
        let record: SettingsRecord = serde_json::from_str(&contents)
            .map_err(|e| GalleryError::Storage(format!("failed to parse JSON: {e}")))?;

        tracing::debug!(version = record.version, saved_at = ?record.saved_at, "loaded settings");
        Ok(record)
    }

    fn save_to_file(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.record)
            .map_err(|e| GalleryError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        self.dirty = false;
        tracing::debug!(path = ?self.file_path, "settings saved");
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<DisplaySettings> {
        Ok(self.record.settings)
    }

    fn save(&mut self, settings: &DisplaySettings) -> Result<()> {
        let _span = tracing::debug_span!("json_save_settings", settings = ?settings).entered();

        if self.record.settings == *settings && self.record.saved_at.is_some() {
            tracing::trace!("settings unchanged, skipping save");
            return Ok(());
        }

        self.record.settings = *settings;
        self.record.saved_at = Some(chrono::Utc::now().timestamp());
        self.dirty = true;
        self.save_to_file()
    }
}

impl Drop for JsonSettingsStore {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.save_to_file() {
                tracing::error!(error = %e, "failed to save settings on drop");
            }
        }
    }
}
