//! Filesystem locations used by the client.
//!
//! Everything the client writes (preferences, logs, trace export) lives in one
//! per-user data directory, resolved with the `dirs` crate.

use std::path::{Path, PathBuf};

/// Returns the default data directory for Galleria files.
///
/// This is `<local data dir>/galleria`, e.g. `~/.local/share/galleria` on Linux.
/// Falls back to the system temp directory when the platform reports no data
/// directory.
#[must_use]
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("galleria")
}

/// Expands a leading `~` to the user's home directory.
///
/// # Examples
///
/// ```
/// use galleria::infrastructure::expand_tilde;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
/// if let Some(home) = dirs::home_dir() {
///     assert_eq!(expand_tilde("~/pictures"), home.join("pictures"));
/// }
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest),
        (None, Some(home)) if path == "~" => home,
        _ => PathBuf::from(path),
    }
}

/// Display preferences file.
#[must_use]
pub fn settings_file(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}

/// Human-readable log file written by the `fmt` layer.
#[must_use]
pub fn log_file(data_dir: &Path) -> PathBuf {
    data_dir.join("galleria.log")
}

/// JSON-lines span export.
#[must_use]
pub fn trace_file(data_dir: &Path) -> PathBuf {
    data_dir.join("galleria-otlp.json")
}
