//! Error types for the Galleria client.
//!
//! This module defines the centralized error type [`GalleryError`] and a type alias
//! [`Result`] for convenient error handling throughout the crate. All errors are
//! implemented using the `thiserror` crate for automatic `Error` trait implementation.
//!
//! None of these errors is fatal to the engine. Listing failures are folded into
//! the pagination fetch state, stale responses never become errors at all, and the
//! runtime logs anything else and carries on.

use thiserror::Error;

/// The main error type for Galleria operations.
///
/// # Examples
///
/// ```
/// use galleria::domain::GalleryError;
///
/// fn check_base(base: &str) -> Result<(), GalleryError> {
///     if base.is_empty() {
///         return Err(GalleryError::Config("api_base must not be empty".to_string()));
///     }
///     Ok(())
/// }
/// assert!(check_base("").is_err());
/// ```
#[derive(Debug, Error)]
pub enum GalleryError {
    /// The listing or detail API could not be reached, or answered with a
    /// non-success status.
    #[error("Network error: {0}")]
    Network(String),

    /// Transport-level failure reported by the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body did not match the expected wire format.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Reading or writing persisted display preferences failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Communication with the background worker failed.
    ///
    /// Occurs when the request channel is closed (worker thread gone) or the
    /// worker could not be started.
    #[error("Worker communication error: {0}")]
    Worker(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An API base or location URL could not be parsed.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// A specialized `Result` type for Galleria operations.
pub type Result<T> = std::result::Result<T, GalleryError>;
