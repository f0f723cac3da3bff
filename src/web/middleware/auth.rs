//! Shared-key authentication.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use std::collections::HashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Header carrying the shared key.
pub const KEY_HEADER: &str = "x-halal-blob-key";

/// Query parameter carrying the shared key when the header is absent.
pub const KEY_QUERY_PARAM: &str = "key";

/// Key presented by a request: the header if non-empty, else the
/// [`KEY_QUERY_PARAM`] query parameter (last occurrence), else the empty
/// string.
pub fn presented_key(parts: &Parts) -> String {
    let header_key = parts
        .headers
        .get(KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .unwrap_or("");
    if !header_key.is_empty() {
        return header_key.to_string();
    }

    Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(mut params)| params.remove(KEY_QUERY_PARAM))
        .unwrap_or_default()
}

/// Whether `presented` unlocks a service configured with `expected`.
///
/// Both must be non-empty; the comparison is constant-time.
pub fn key_matches(expected: &str, presented: &str) -> bool {
    if expected.is_empty() || presented.is_empty() {
        return false;
    }
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

/// Extractor guarding every blob endpoint.
///
/// Put it first in a handler's argument list so it rejects before any other
/// input is looked at.
#[derive(Debug, Clone, Copy)]
pub struct BlobKey;

impl FromRequestParts<Arc<AppState>> for BlobKey {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let presented = presented_key(parts);
            if key_matches(&state.settings.key, &presented) {
                return Ok(BlobKey);
            }

            if !state.settings.has_key() {
                tracing::warn!(path = %parts.uri.path(), "Rejected request: no key configured");
            } else {
                tracing::warn!(path = %parts.uri.path(), "Rejected request: invalid key");
            }
            Err(ApiError::invalid_key())
        })
    }
}
