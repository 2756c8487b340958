//! Wire format of the listing API.
//!
//! The server has shipped several spellings of the same response over time
//! (`files` / `imageFiles` / `items`, `total` / `totalImageCount`, snake and camel
//! case thumbnail sizes). All of them decode into [`ListingPage`], which then
//! converts its raw entries into domain [`Item`]s.

use super::item::{Folder, Item};
use serde::{Deserialize, Serialize};

/// Thumbnail aspect used when the server reports none (or zero).
pub const DEFAULT_THUMBNAIL_SIZE: f64 = 512.0;

/// One page returned by `GET /api/images/list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    pub folders: Option<Vec<Folder>>,

    #[serde(default, alias = "items", alias = "imageFiles")]
    pub files: Option<Vec<WireItem>>,

    #[serde(default, alias = "totalImageCount")]
    pub total: Option<u64>,

    #[serde(default, alias = "thumbnailWidth")]
    pub thumbnail_width: Option<f64>,

    #[serde(default, alias = "thumbnailHeight")]
    pub thumbnail_height: Option<f64>,
}

/// A file entry exactly as the server sends it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default, alias = "width")]
    pub w: Option<u32>,
    #[serde(default, alias = "height")]
    pub h: Option<u32>,
}

impl WireItem {
    /// Converts to a domain item. Entries carrying neither `id` nor `src` are
    /// unusable and yield `None`.
    #[must_use]
    pub fn into_item(self) -> Option<Item> {
        let id = self.id.or_else(|| self.src.clone())?;
        let display_src = self.src.unwrap_or_else(|| id.clone());
        let name = self.name.unwrap_or_else(|| {
            display_src
                .rsplit('/')
                .next()
                .unwrap_or(display_src.as_str())
                .to_string()
        });

        Some(Item {
            id,
            display_src,
            thumb_src: self.thumb.filter(|t| !t.is_empty()),
            width: self.w,
            height: self.h,
            name,
        })
    }
}

impl ListingPage {
    /// Domain items of this page, in server order.
    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        let files = self.files.clone().unwrap_or_default();
        let raw_count = files.len();
        let items: Vec<Item> = files.into_iter().filter_map(WireItem::into_item).collect();

        if items.len() != raw_count {
            tracing::debug!(
                dropped = raw_count - items.len(),
                "skipping listing entries without id or src"
            );
        }

        items
    }

    #[must_use]
    pub fn folders(&self) -> Vec<Folder> {
        self.folders.clone().unwrap_or_default()
    }

    /// Reported `(width, height)` thumbnail aspect, defaulting missing or zero
    /// values.
    #[must_use]
    pub fn thumbnail_size(&self) -> (f64, f64) {
        let pick = |v: Option<f64>| v.filter(|v| *v > 0.0).unwrap_or(DEFAULT_THUMBNAIL_SIZE);
        (pick(self.thumbnail_width), pick(self.thumbnail_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_current_server_shape() {
        let json = r#"{
            "files": [{"name": "a.png", "src": "/img/ns/a.png", "w": 800, "h": 600}],
            "folders": [{"name": "05", "path": "ns/2024/05"}],
            "thumbnail_width": 640.5,
            "thumbnail_height": 0
        }"#;
        let page: ListingPage = serde_json::from_str(json).unwrap();

        let items = page.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "/img/ns/a.png");
        assert_eq!(items[0].width, Some(800));
        assert_eq!(page.folders()[0].path, "ns/2024/05");
        assert_eq!(page.thumbnail_size(), (640.5, DEFAULT_THUMBNAIL_SIZE));
        assert_eq!(page.total, None);
    }

    #[test]
    fn decodes_camel_case_draft_shape() {
        let json = r#"{
            "folders": null,
            "imageFiles": [{"src": "/img/b.png", "name": "b.png", "thumb": "/t/b.png"}],
            "totalImageCount": 42,
            "thumbnailWidth": 3,
            "thumbnailHeight": 4
        }"#;
        let page: ListingPage = serde_json::from_str(json).unwrap();

        assert_eq!(page.total, Some(42));
        assert!(page.folders().is_empty());
        assert_eq!(page.items()[0].thumb_src.as_deref(), Some("/t/b.png"));
        assert_eq!(page.thumbnail_size(), (3.0, 4.0));
    }

    #[test]
    fn explicit_id_wins_over_src_and_name_falls_back_to_file_name() {
        let json = r#"{"items": [{"id": "a", "src": "/img/x/a.png"}, {"name": "orphan"}]}"#;
        let page: ListingPage = serde_json::from_str(json).unwrap();

        let items = page.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[0].name, "a.png");
    }
}
