//! Listing API clients.
//!
//! [`ListingClient`] is the seam between the worker and the content server. The
//! HTTP implementation speaks the server's `/api/images/*` endpoints; tests plug
//! in scripted clients instead.

use crate::domain::error::{GalleryError, Result};
use crate::domain::{DirectoryKey, ListingPage};
use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

/// Source of listing pages and image details.
pub trait ListingClient: Send {
    /// Fetches the page of `dir` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or the body cannot be decoded.
    fn list(&self, dir: &DirectoryKey, offset: usize, recursive: bool) -> Result<ListingPage>;

    /// Fetches the metadata record of the image at `path`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ListingClient::list`].
    fn details(&self, path: &str) -> Result<serde_json::Value>;
}

/// Blocking HTTP client for the content server. Meant to run on the worker
/// thread only.
#[derive(Debug, Clone)]
pub struct HttpListingClient {
    base: Url,
    http: Client,
}

impl HttpListingClient {
    /// Creates a client for the server at `api_base`.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_base` is not an absolute URL or the HTTP client
    /// cannot be built.
    ///
    /// # Examples
    ///
    /// ```
    /// use galleria::domain::DirectoryKey;
    /// use galleria::worker::HttpListingClient;
    /// use std::time::Duration;
    ///
    /// let client = HttpListingClient::new("http://nas.local:8080", Duration::from_secs(5))?;
    /// let url = client.list_url(&DirectoryKey::new("ns/2024"), 40, true)?;
    /// assert_eq!(
    ///     url.as_str(),
    ///     "http://nas.local:8080/api/images/list?dir=ns%2F2024&offset=40&recursive=1"
    /// );
    /// # Ok::<(), galleria::GalleryError>(())
    /// ```
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(api_base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("galleria/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::debug!(base = %base, timeout_secs = timeout.as_secs(), "listing client ready");
        Ok(Self { base, http })
    }

    /// URL of the listing request for `dir` at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be joined onto the base URL.
    pub fn list_url(&self, dir: &DirectoryKey, offset: usize, recursive: bool) -> Result<Url> {
        let mut url = self.base.join("api/images/list")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("dir", dir.as_str())
                .append_pair("offset", &offset.to_string());
            if recursive {
                query.append_pair("recursive", "1");
            }
        }
        Ok(url)
    }

    /// URL of the details request for `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be joined onto the base URL.
    pub fn details_url(&self, path: &str) -> Result<Url> {
        let mut url = self.base.join("api/images/details")?;
        url.query_pairs_mut().append_pair("path", path);
        Ok(url)
    }

    fn get(&self, url: Url) -> Result<reqwest::blocking::Response> {
        let response = self.http.get(url.clone()).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(GalleryError::Network(format!("{url}: HTTP {status}")));
        }
        Ok(response)
    }
}

impl ListingClient for HttpListingClient {
    fn list(&self, dir: &DirectoryKey, offset: usize, recursive: bool) -> Result<ListingPage> {
        let url = self.list_url(dir, offset, recursive)?;
        let _span = tracing::debug_span!("http_list", url = %url).entered();

        self.get(url)?
            .json::<ListingPage>()
            .map_err(|e| GalleryError::Decode(format!("listing response: {e}")))
    }

    fn details(&self, path: &str) -> Result<serde_json::Value> {
        let url = self.details_url(path)?;
        let _span = tracing::debug_span!("http_details", url = %url).entered();

        self.get(url)?
            .json::<serde_json::Value>()
            .map_err(|e| GalleryError::Decode(format!("details response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_path_is_kept_when_joining_endpoints() {
        let client = HttpListingClient::new("http://host/gallery", Duration::from_secs(1)).unwrap();
        let url = client.list_url(&DirectoryKey::root(), 0, false).unwrap();
        assert_eq!(url.as_str(), "http://host/gallery/api/images/list?dir=&offset=0");
    }

    #[test]
    fn details_path_is_query_encoded() {
        let client = HttpListingClient::new("http://host:8080/", Duration::from_secs(1)).unwrap();
        let url = client.details_url("/img/ns/a b.png").unwrap();
        assert_eq!(url.query(), Some("path=%2Fimg%2Fns%2Fa+b.png"));
    }

    #[test]
    fn relative_base_is_rejected() {
        assert!(matches!(
            HttpListingClient::new("nas.local", Duration::from_secs(1)),
            Err(GalleryError::Url(_))
        ));
    }
}
