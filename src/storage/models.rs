//! Persisted display preference records.

use serde::{Deserialize, Serialize};

/// Grid tile width used until the user picks another one.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 180;

/// User-facing display preferences.
///
/// Missing fields in a stored file fall back to their defaults, so files written
/// by older versions keep loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Minimum grid tile width in pixels.
    pub thumbnail_size: u32,

    /// Open slides zoomed to fill the screen instead of fitting inside it.
    pub fill_screen: bool,

    /// List files of sub-directories too.
    pub files_recursive: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            fill_screen: false,
            files_recursive: false,
        }
    }
}

/// On-disk container for [`DisplaySettings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    /// Storage format version for future migrations.
    pub version: u32,

    /// Unix timestamp of the last save, `None` if never saved.
    #[serde(default)]
    pub saved_at: Option<i64>,

    #[serde(default)]
    pub settings: DisplaySettings,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            version: 1,
            saved_at: None,
            settings: DisplaySettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_records_fill_in_defaults() {
        let record: SettingsRecord =
            serde_json::from_str(r#"{"version": 1, "settings": {"fill_screen": true}}"#).unwrap();

        assert!(record.settings.fill_screen);
        assert_eq!(record.settings.thumbnail_size, DEFAULT_THUMBNAIL_SIZE);
        assert!(!record.settings.files_recursive);
        assert_eq!(record.saved_at, None);
    }
}
