//! CORS layer for browser clients calling the blob API directly.

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use super::auth::KEY_HEADER;

/// Create a CORS layer from the configured origins.
///
/// With no (valid) origins any origin is allowed.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    let parsed_origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if parsed_origins.is_empty() {
        return layer.allow_headers(Any).allow_origin(Any);
    }

    layer
        .allow_headers([
            HeaderName::from_static(KEY_HEADER),
            CONTENT_TYPE,
            ACCEPT,
        ])
        .allow_origin(parsed_origins)
}
