//! In-memory browser history.
//!
//! [`MemoryHistory`] behaves like a browser's session history: a list of
//! locations with a cursor. Pushing drops every entry after the cursor, back and
//! forward move the cursor and report the location reached, which the runtime
//! then feeds to the engine as `LocationPopped` or `DirectoryChanged`.
//!
//! Locations follow the gallery's routes:
//!
//! - `/images/<dir>?src=<item>` for the grid, `src` naming the open item;
//! - `/imagedetails?src=..&dir=..&index=..` for the details page.

use crate::domain::error::Result;
use crate::domain::DirectoryKey;
use url::Url;

/// Path prefix of gallery locations.
pub const IMAGES_ROUTE: &str = "/images";

/// Path of the details page.
pub const DETAILS_ROUTE: &str = "/imagedetails";

/// Returns the `src` query parameter of `url`.
#[must_use]
pub fn src_of(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "src")
        .map(|(_, value)| value.into_owned())
}

/// Returns a copy of `url` with its `src` parameter set to `src`, or removed
/// when `src` is `None`. Other query parameters are kept in order.
#[must_use]
pub fn with_src(url: &Url, src: Option<&str>) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "src")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut next = url.clone();
    next.set_query(None);
    if !kept.is_empty() || src.is_some() {
        let mut query = next.query_pairs_mut();
        for (key, value) in &kept {
            query.append_pair(key, value);
        }
        if let Some(src) = src {
            query.append_pair("src", src);
        }
    }
    next
}

/// Directory a gallery location points at, `None` for other routes.
#[must_use]
pub fn dir_of(url: &Url) -> Option<DirectoryKey> {
    let rest = url.path().strip_prefix(IMAGES_ROUTE)?;
    if !(rest.is_empty() || rest.starts_with('/')) {
        return None;
    }
    let decoded = urlencoding::decode(rest).map_or_else(|_| rest.to_string(), std::borrow::Cow::into_owned);
    Some(DirectoryKey::new(decoded))
}

/// Gallery location of `dir` on the same origin as `base`.
#[must_use]
pub fn dir_url(base: &Url, dir: &DirectoryKey) -> Url {
    let encoded: Vec<String> = dir
        .as_str()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect();

    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    if encoded.is_empty() {
        url.set_path(IMAGES_ROUTE);
    } else {
        url.set_path(&format!("{IMAGES_ROUTE}/{}", encoded.join("/")));
    }
    url
}

/// Session history kept in memory.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<Url>,
    cursor: usize,
}

impl MemoryHistory {
    #[must_use]
    pub fn new(initial: Url) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// Starts a history at `location`.
    ///
    /// # Errors
    ///
    /// Returns an error if `location` is not an absolute URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use galleria::infrastructure::MemoryHistory;
    ///
    /// let mut history = MemoryHistory::parse("http://gallery.local/images/2024?src=a.png")?;
    /// assert_eq!(history.current_src().as_deref(), Some("a.png"));
    /// assert_eq!(history.current_dir().map(|d| d.as_str().to_string()).as_deref(), Some("2024"));
    ///
    /// history.replace_src(None);
    /// assert_eq!(history.current().as_str(), "http://gallery.local/images/2024");
    /// # Ok::<(), galleria::GalleryError>(())
    /// ```
    pub fn parse(location: &str) -> Result<Self> {
        Ok(Self::new(Url::parse(location)?))
    }

    #[must_use]
    pub fn current(&self) -> &Url {
        &self.entries[self.cursor]
    }

    /// Number of entries, including those ahead of the cursor.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the cursor, `0` being the oldest entry.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor
    }

    /// Adds `url` after the cursor, discarding the forward entries.
    pub fn push(&mut self, url: Url) {
        self.entries.truncate(self.cursor + 1);
        tracing::debug!(url = %url, depth = self.entries.len() + 1, "history push");
        self.entries.push(url);
        self.cursor += 1;
    }

    /// Overwrites the current entry.
    pub fn replace(&mut self, url: Url) {
        tracing::debug!(url = %url, "history replace");
        self.entries[self.cursor] = url;
    }

    /// Moves one entry back. Returns the location reached, or `None` at the
    /// oldest entry.
    pub fn back(&mut self) -> Option<&Url> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Moves one entry forward. Returns the location reached, or `None` at the
    /// newest entry.
    pub fn forward(&mut self) -> Option<&Url> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    #[must_use]
    pub fn current_src(&self) -> Option<String> {
        src_of(self.current())
    }

    #[must_use]
    pub fn current_dir(&self) -> Option<DirectoryKey> {
        dir_of(self.current())
    }

    /// Pushes the current location with `src` changed.
    pub fn push_src(&mut self, src: Option<&str>) {
        let next = with_src(self.current(), src);
        self.push(next);
    }

    /// Replaces the current location with `src` changed.
    pub fn replace_src(&mut self, src: Option<&str>) {
        let next = with_src(self.current(), src);
        self.replace(next);
    }

    /// Pushes the gallery location of `dir`, without `src`.
    pub fn push_dir(&mut self, dir: &DirectoryKey) {
        let next = dir_url(self.current(), dir);
        self.push(next);
    }

    /// Pushes the details page of `src`.
    pub fn push_details(&mut self, src: &str, dir: &DirectoryKey, index: usize) {
        let mut next = self.current().clone();
        next.set_path(DETAILS_ROUTE);
        next.set_query(None);
        next.query_pairs_mut()
            .append_pair("src", src)
            .append_pair("dir", dir.as_str())
            .append_pair("index", &index.to_string());
        self.push(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> MemoryHistory {
        MemoryHistory::parse("http://gallery.local/images/2024/05").unwrap()
    }

    #[test]
    fn push_discards_forward_entries() {
        let mut history = history();
        history.push_src(Some("a"));
        history.push_src(Some("b"));
        history.back();
        history.back();
        history.push_src(Some("c"));

        assert_eq!(history.len(), 2);
        assert!(history.forward().is_none());
        assert_eq!(history.current_src().as_deref(), Some("c"));
    }

    #[test]
    fn replace_keeps_depth() {
        let mut history = history();
        history.push_src(Some("a"));
        history.replace_src(Some("b"));
        history.replace_src(None);

        assert_eq!(history.len(), 2);
        assert_eq!(history.current_src(), None);
        assert_eq!(history.back().map(Url::as_str), Some("http://gallery.local/images/2024/05"));
    }

    #[test]
    fn back_and_forward_stop_at_the_ends() {
        let mut history = history();
        assert!(history.back().is_none());
        history.push_src(Some("a"));
        assert!(history.forward().is_none());
        assert!(history.back().is_some());
        assert_eq!(history.forward().and_then(src_of).as_deref(), Some("a"));
    }

    #[test]
    fn src_round_trips_through_query_encoding() {
        let url = Url::parse("http://h/images?view=grid").unwrap();
        let with = with_src(&url, Some("/img/a b&c.png"));
        assert_eq!(src_of(&with).as_deref(), Some("/img/a b&c.png"));
        assert_eq!(with_src(&with, None).as_str(), "http://h/images?view=grid");
    }

    #[test]
    fn directories_map_to_image_routes() {
        let base = Url::parse("http://h/images/x?src=a").unwrap();
        let url = dir_url(&base, &DirectoryKey::new("2024/my trip"));
        assert_eq!(url.as_str(), "http://h/images/2024/my%20trip");
        assert_eq!(dir_of(&url), Some(DirectoryKey::new("2024/my trip")));

        assert_eq!(dir_of(&dir_url(&base, &DirectoryKey::root())), Some(DirectoryKey::root()));
        assert_eq!(dir_of(&Url::parse("http://h/imagedetails").unwrap()), None);
    }

    #[test]
    fn details_page_carries_its_context() {
        let mut history = history();
        history.push_details("/img/a.png", &DirectoryKey::new("2024/05"), 3);
        let url = history.current();
        assert_eq!(url.path(), DETAILS_ROUTE);
        assert_eq!(url.query(), Some("src=%2Fimg%2Fa.png&dir=2024%2F05&index=3"));
        assert_eq!(history.current_dir(), None);
    }
}
