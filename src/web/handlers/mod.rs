//! API handlers for the blob service.

pub mod blob;
pub mod health;

pub use blob::*;
pub use health::*;

use axum::http::{header::HOST, uri::Authority, HeaderMap, Uri};

use crate::config::BlobSettings;
use crate::storage::BlobStore;

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Blob and sidecar storage.
    pub store: BlobStore,
    /// Service settings.
    pub settings: BlobSettings,
    /// MIME types derived from the allowed extensions.
    pub allowed_mimes: Vec<String>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: BlobStore, settings: BlobSettings) -> Self {
        let allowed_mimes = settings.allowed_mime_types();
        Self {
            store,
            settings,
            allowed_mimes,
        }
    }

    /// Base for download URLs: the configured base URL, or `https://` plus
    /// the host the request was addressed to.
    ///
    /// A Host header that is not a plain `host[:port]` authority is ignored.
    pub fn base_url(&self, headers: &HeaderMap, uri: &Uri) -> String {
        if let Some(base) = &self.settings.base_url {
            return base.clone();
        }

        let host = headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .and_then(|raw| {
                let host = host_authority(raw);
                if host.is_none() {
                    tracing::debug!(host = %raw, "Ignoring malformed Host header");
                }
                host
            })
            .or_else(|| uri.authority().and_then(|a| host_authority(a.as_str())))
            .unwrap_or_else(|| "localhost".to_string());

        format!("https://{host}")
    }

    /// Whether a sniffed MIME type is allowed.
    pub fn allows_mime(&self, mime: &str) -> bool {
        self.allowed_mimes.iter().any(|m| m == mime)
    }
}

/// `raw` as a `host[:port]` authority, without userinfo.
fn host_authority(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.contains('@') {
        return None;
    }
    raw.parse::<Authority>().ok().map(|a| a.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state_with(base_url: Option<&str>) -> (TempDir, AppState) {
        let temp_dir = TempDir::new().unwrap();
        let store = BlobStore::open(temp_dir.path()).unwrap();
        let settings = BlobSettings {
            base_url: base_url.map(str::to_string),
            ..BlobSettings::default()
        };
        (temp_dir, AppState::new(store, settings))
    }

    #[test]
    fn test_base_url_configured() {
        let (_temp_dir, state) = state_with(Some("https://cdn.example.com"));
        let mut headers = HeaderMap::new();
        headers.insert(HOST, "ignored.example".parse().unwrap());

        assert_eq!(
            state.base_url(&headers, &Uri::from_static("/api/blob/list")),
            "https://cdn.example.com"
        );
    }

    #[test]
    fn test_base_url_from_host_header() {
        let (_temp_dir, state) = state_with(None);
        let mut headers = HeaderMap::new();
        headers.insert(HOST, "files.example.org:8443".parse().unwrap());

        assert_eq!(
            state.base_url(&headers, &Uri::from_static("/api/blob/list")),
            "https://files.example.org:8443"
        );
    }

    #[test]
    fn test_base_url_fallbacks() {
        let (_temp_dir, state) = state_with(None);
        let headers = HeaderMap::new();

        assert_eq!(
            state.base_url(&headers, &Uri::from_static("http://uri.example/api")),
            "https://uri.example"
        );
        assert_eq!(
            state.base_url(&headers, &Uri::from_static("/api")),
            "https://localhost"
        );
    }

    #[test]
    fn test_base_url_ignores_malformed_host() {
        let (_temp_dir, state) = state_with(None);

        for bad in ["evil.example/phish", "user@evil.example", "two words", "a?b"] {
            let mut headers = HeaderMap::new();
            headers.insert(HOST, bad.parse().unwrap());
            assert_eq!(
                state.base_url(&headers, &Uri::from_static("/api/blob/list")),
                "https://localhost",
                "host {bad:?}"
            );
        }
    }

    #[test]
    fn test_host_authority() {
        assert_eq!(host_authority(" files.example.org "), Some("files.example.org".to_string()));
        assert_eq!(host_authority("[::1]:8080"), Some("[::1]:8080".to_string()));
        assert_eq!(host_authority(""), None);
        assert_eq!(host_authority("a/b"), None);
        assert_eq!(host_authority("u:p@h"), None);
    }

    #[test]
    fn test_allows_mime() {
        let (_temp_dir, state) = state_with(None);
        assert!(state.allows_mime("image/png"));
        assert!(!state.allows_mime("text/plain"));
    }
}
