//! Galleria: an incrementally-loaded media gallery client.
//!
//! Galleria lists the directories and images served by a content API, shows them
//! as a grid that loads more pages as it is scrolled, and opens a full-screen
//! viewer whose open item is mirrored in the location's `src` query parameter,
//! so back/forward and shared links behave like they do in a browser.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Terminal shell (main.rs)                           │  ← Runtime, executes actions
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← The engine
//! │  - Item store, pagination                           │
//! │  - Location bridge, viewer session                  │
//! │  - Event handling, action emission                  │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ UI Layer      │   │ Storage Layer │   │ Worker Layer  │
//! │ (ui/)         │   │ (storage/)    │   │ (worker/)     │
//! │ - View model  │   │ - Preferences │   │ - HTTP client │
//! │ - Text render │   │ - JSON I/O    │   │ - Thread+chan │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Data paths, in-memory history (infrastructure/)  │
//! │  - Items, listing wire format, errors (domain/)     │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - Log file, JSON-lines span export                 │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Engine in one paragraph
//!
//! Entering a directory starts a session: the item list is cleared, the
//! pagination generation is bumped and page 0 is requested. Pages are fetched one
//! at a time; a response is merged only if it belongs to the request in flight
//! for the current session, so late answers for a directory the user already
//! left are dropped. Opening an item pushes one history entry, moving between
//! slides and closing replace it, and a back/forward pop re-derives the viewer
//! from the popped `src` without writing history.
//!
//! # Configuration
//!
//! ```toml
//! api_base = "http://nas.local:8080"
//! trace_level = "debug"
//! request_timeout_secs = 10
//! deep_link_autoload = true
//! scroll_restore = "last_viewed"   # or "opened_at"
//! ```
//!
//! # Example
//!
//! ```rust
//! use galleria::{handle_event, initialize, Action, Config, Event};
//! use galleria::domain::DirectoryKey;
//! use galleria::storage::DisplaySettings;
//!
//! let config = Config::default();
//! let mut state = initialize(&config, DisplaySettings::default(), None);
//!
//! let (_, actions) = handle_event(
//!     &mut state,
//!     &Event::DirectoryChanged { dir: DirectoryKey::root(), src: None },
//! )?;
//! for action in actions {
//!     if let Action::PostToWorker(message) = action {
//!         // hand `message` to a WorkerHandle...
//!         # let _ = message;
//!     }
//! }
//! # Ok::<(), galleria::GalleryError>(())
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod storage;
pub mod worker;

pub mod ui;

pub mod observability;

pub use app::{handle_event, Action, AppState, EngineOptions, Event, ScrollRestore};
pub use domain::{GalleryError, Result};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default listing server.
pub const DEFAULT_API_BASE: &str = "http://localhost:8080";

/// Default HTTP timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Longest accepted HTTP timeout, in seconds. Larger values are clamped.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the content API. Default: `http://localhost:8080`
    pub api_base: String,

    /// Tracing filter directive, e.g. `debug` or `galleria=trace`.
    ///
    /// `RUST_LOG` takes precedence. Default: `"info"`
    pub trace_level: Option<String>,

    /// Where preferences, logs and traces are written.
    ///
    /// Default: the platform's local data directory, see
    /// [`infrastructure::get_data_dir`].
    pub data_dir: Option<PathBuf>,

    /// HTTP request timeout in seconds. Default: 10
    pub request_timeout_secs: u64,

    /// Keep loading pages until a deep-linked item is found. Default: `true`
    pub deep_link_autoload: bool,

    /// Grid index restored when the viewer closes. Default: last viewed
    pub scroll_restore: ScrollRestore,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            trace_level: None,
            data_dir: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            deep_link_autoload: true,
            scroll_restore: ScrollRestore::LastViewed,
        }
    }
}

impl Config {
    /// Builds a configuration from string key/value pairs.
    ///
    /// Every key is optional and an unparsable value falls back to its default,
    /// so a typo never prevents the client from starting.
    ///
    /// # Parsing Rules
    ///
    /// - `api_base`, `trace_level`: taken as-is (empty values ignored)
    /// - `data_dir`: `~` expanded
    /// - `request_timeout_secs`: positive integer, at most one hour
    /// - `deep_link_autoload`: `true`/`false`/`1`/`0`/`yes`/`no`
    /// - `scroll_restore`: `last_viewed` or `opened_at`
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use galleria::{Config, ScrollRestore};
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("api_base".to_string(), "http://nas:9000".to_string());
    /// map.insert("request_timeout_secs".to_string(), "soon".to_string());
    /// map.insert("scroll_restore".to_string(), "opened_at".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.api_base, "http://nas:9000");
    /// assert_eq!(config.request_timeout_secs, 10);
    /// assert_eq!(config.scroll_restore, ScrollRestore::OpenedAt);
    /// ```
    #[must_use]
    pub fn from_map(config: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| config.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let request_timeout_secs = get("request_timeout_secs")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(|secs| {
                if secs > MAX_REQUEST_TIMEOUT_SECS {
                    tracing::debug!(secs, max = MAX_REQUEST_TIMEOUT_SECS, "request_timeout_secs too large, clamping");
                }
                secs.min(MAX_REQUEST_TIMEOUT_SECS)
            })
            .unwrap_or(defaults.request_timeout_secs);

        let deep_link_autoload = get("deep_link_autoload")
            .and_then(parse_bool)
            .unwrap_or(defaults.deep_link_autoload);

        let scroll_restore = get("scroll_restore")
            .and_then(|value| {
                let parsed = ScrollRestore::parse(value);
                if parsed.is_none() {
                    tracing::debug!(value, "unknown scroll_restore, using default");
                }
                parsed
            })
            .unwrap_or(defaults.scroll_restore);

        Self {
            api_base: get("api_base").map_or(defaults.api_base, str::to_string),
            trace_level: get("trace_level").map(str::to_string),
            data_dir: get("data_dir").map(infrastructure::expand_tilde),
            request_timeout_secs,
            deep_link_autoload,
            scroll_restore,
        }
    }

    /// Loads a TOML configuration file. Scalar values are read with the same
    /// rules as [`Config::from_map`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses TOML configuration text.
    ///
    /// # Errors
    ///
    /// Returns an error if `contents` is not valid TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let table: toml::Table =
            toml::from_str(contents).map_err(|e| GalleryError::Config(format!("invalid TOML: {e}")))?;

        let map: BTreeMap<String, String> = table
            .into_iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s,
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Boolean(b) => b.to_string(),
                    other => {
                        tracing::debug!(key = %key, value = %other, "ignoring non-scalar config value");
                        return None;
                    }
                };
                Some((key, value))
            })
            .collect();

        Ok(Self::from_map(&map))
    }

    /// Resolved data directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(infrastructure::get_data_dir)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            deep_link_autoload: self.deep_link_autoload,
            scroll_restore: self.scroll_restore,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Creates the engine state for a freshly started client.
///
/// `settings` are the stored display preferences and `src` the location's
/// `src` parameter at startup (a deep link). Nothing is fetched until the first
/// `DirectoryChanged` event.
#[must_use]
pub fn initialize(config: &Config, settings: storage::DisplaySettings, src: Option<String>) -> AppState {
    tracing::debug!(api_base = %config.api_base, deep_link = ?src, "initializing galleria");
    AppState::new(settings, config.engine_options(), src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_map_gives_defaults() {
        assert_eq!(Config::from_map(&BTreeMap::new()), Config::default());
    }

    #[test]
    fn huge_timeouts_are_clamped() {
        let mut map = BTreeMap::new();
        map.insert("request_timeout_secs".to_string(), u64::MAX.to_string());

        let config = Config::from_map(&map);
        assert_eq!(config.request_timeout_secs, MAX_REQUEST_TIMEOUT_SECS);
        assert_eq!(
            config.request_timeout().checked_add(Duration::from_secs(1)),
            Some(Duration::from_secs(MAX_REQUEST_TIMEOUT_SECS + 1))
        );
    }

    #[test]
    fn boolean_spellings_are_accepted() {
        let mut map = BTreeMap::new();
        map.insert("deep_link_autoload".to_string(), "No".to_string());
        assert!(!Config::from_map(&map).deep_link_autoload);

        map.insert("deep_link_autoload".to_string(), "maybe".to_string());
        assert!(Config::from_map(&map).deep_link_autoload);
    }

    #[test]
    fn toml_values_of_any_scalar_type_are_read() {
        let config = Config::from_toml_str(
            r#"
            api_base = "http://nas.local:8080"
            request_timeout_secs = 3
            deep_link_autoload = false
            scroll_restore = "opened-at"
            ignored = [1, 2]
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base, "http://nas.local:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert!(!config.engine_options().deep_link_autoload);
        assert_eq!(config.scroll_restore, ScrollRestore::OpenedAt);
    }

    #[test]
    fn toml_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("galleria.toml");
        std::fs::write(&path, "trace_level = \"debug\"\ndata_dir = \"/srv/galleria\"\n").unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
        assert_eq!(config.data_dir(), PathBuf::from("/srv/galleria"));
    }

    #[test]
    fn broken_toml_is_a_config_error() {
        assert!(matches!(Config::from_toml_str("api_base = "), Err(GalleryError::Config(_))));
    }
}
