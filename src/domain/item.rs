//! Listing entries and directory identity.
//!
//! [`Item`] is one listed media entry with a stable identity, [`Folder`] is a
//! sub-directory entry forwarded untouched to the grid, and [`DirectoryKey`]
//! names the listing scope the user is currently browsing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback slide size handed to the viewer when the server did not report one.
pub const DEFAULT_SLIDE_WIDTH: u32 = 1600;

/// Fallback slide height, see [`DEFAULT_SLIDE_WIDTH`].
pub const DEFAULT_SLIDE_HEIGHT: u32 = 900;

/// Identifier of the browsed directory. The root listing is the empty key.
///
/// Keys are normalized on construction so that `"2024/05"`, `"/2024/05"` and
/// `"2024/05/"` all name the same session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectoryKey(String);

impl DirectoryKey {
    /// The root listing.
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Creates a key from a raw path, trimming surrounding slashes.
    ///
    /// # Examples
    ///
    /// ```
    /// use galleria::domain::DirectoryKey;
    ///
    /// assert_eq!(DirectoryKey::new("/2024/05/").as_str(), "2024/05");
    /// assert!(DirectoryKey::new("").is_root());
    /// ```
    #[must_use]
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(path.as_ref().trim_matches('/').to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Breadcrumb trail from the root down to this directory.
    ///
    /// The first crumb is always the root (label `root`, empty path); each
    /// following crumb extends the path by one segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use galleria::domain::DirectoryKey;
    ///
    /// let crumbs = DirectoryKey::new("2026/01").crumbs();
    /// let paths: Vec<_> = crumbs.iter().map(|c| c.path.as_str()).collect();
    /// assert_eq!(paths, ["", "2026", "2026/01"]);
    /// assert_eq!(crumbs[0].label, "root");
    /// ```
    #[must_use]
    pub fn crumbs(&self) -> Vec<Crumb> {
        let parts: Vec<&str> = self.0.split('/').filter(|p| !p.is_empty()).collect();

        let mut crumbs = Vec::with_capacity(parts.len() + 1);
        crumbs.push(Crumb {
            label: "root".to_string(),
            path: DirectoryKey::root(),
        });

        for (i, part) in parts.iter().enumerate() {
            crumbs.push(Crumb {
                label: (*part).to_string(),
                path: DirectoryKey(parts[..=i].join("/")),
            });
        }

        crumbs
    }
}

impl fmt::Display for DirectoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for DirectoryKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One breadcrumb entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub path: DirectoryKey,
}

/// A listed media entry.
///
/// Two items with the same `id` are the same item, whichever page they arrived
/// in. The id comes from the wire `id` when the server sends one and falls back
/// to the source URL otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub display_src: String,
    pub thumb_src: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub name: String,
}

impl Item {
    /// Creates an item whose id and display source are both `src`.
    #[must_use]
    pub fn new(src: impl Into<String>, name: impl Into<String>) -> Self {
        let src = src.into();
        Self {
            id: src.clone(),
            display_src: src,
            thumb_src: None,
            width: None,
            height: None,
            name: name.into(),
        }
    }

    /// Image shown in the grid tile: the thumbnail when present.
    #[must_use]
    pub fn tile_src(&self) -> &str {
        self.thumb_src.as_deref().unwrap_or(&self.display_src)
    }

    /// Entry of the viewer's data source for this item.
    #[must_use]
    pub fn to_slide(&self) -> Slide {
        Slide {
            src: self.display_src.clone(),
            width: self.width.filter(|w| *w > 0).unwrap_or(DEFAULT_SLIDE_WIDTH),
            height: self.height.filter(|h| *h > 0).unwrap_or(DEFAULT_SLIDE_HEIGHT),
            preview_src: self.tile_src().to_string(),
        }
    }
}

/// A sub-directory entry of the current listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    pub path: String,
}

/// One entry of the full-screen viewer's ordered data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub preview_src: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_keys_are_normalized() {
        assert_eq!(DirectoryKey::new("/a/b/"), DirectoryKey::new("a/b"));
        assert_eq!(DirectoryKey::new("/").as_str(), "");
        assert_eq!(DirectoryKey::root().to_string(), "/");
    }

    #[test]
    fn root_has_a_single_crumb() {
        let crumbs = DirectoryKey::root().crumbs();
        assert_eq!(crumbs.len(), 1);
        assert!(crumbs[0].path.is_root());
    }

    #[test]
    fn crumbs_skip_empty_segments() {
        let crumbs = DirectoryKey::new("a//b").crumbs();
        let labels: Vec<_> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["root", "a", "b"]);
        assert_eq!(crumbs[2].path.as_str(), "a/b");
    }

    #[test]
    fn slide_falls_back_to_default_size_and_source_preview() {
        let item = Item::new("/img/x.png", "x.png");
        let slide = item.to_slide();
        assert_eq!((slide.width, slide.height), (DEFAULT_SLIDE_WIDTH, DEFAULT_SLIDE_HEIGHT));
        assert_eq!(slide.preview_src, "/img/x.png");
    }

    #[test]
    fn slide_prefers_thumbnail_preview_and_real_size() {
        let item = Item {
            thumb_src: Some("/thumb/x.avif".to_string()),
            width: Some(640),
            height: Some(0),
            ..Item::new("/img/x.png", "x.png")
        };
        let slide = item.to_slide();
        assert_eq!(slide.width, 640);
        assert_eq!(slide.height, DEFAULT_SLIDE_HEIGHT);
        assert_eq!(slide.preview_src, "/thumb/x.avif");
    }
}
