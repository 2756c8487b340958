//! Domain layer for the Galleria client.
//!
//! Core types shared by every other layer, independent of HTTP, threads, or the
//! terminal shell.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`item`]: Items, folders, directory keys and viewer slides
//! - [`listing`]: Listing API wire format
//!
//! # Examples
//!
//! ```
//! use galleria::domain::{DirectoryKey, Item};
//!
//! let dir = DirectoryKey::new("2024/05");
//! let item = Item::new("/img/2024/05/a.png", "a.png");
//! assert_eq!(dir.crumbs().len(), 3);
//! assert_eq!(item.id, item.display_src);
//! ```

pub mod error;
pub mod item;
pub mod listing;

pub use error::{GalleryError, Result};
pub use item::{Crumb, DirectoryKey, Folder, Item, Slide};
pub use listing::{ListingPage, WireItem};
