//! Router configuration for the blob API.

use axum::{
    extract::DefaultBodyLimit,
    http::{header::X_CONTENT_TYPE_OPTIONS, HeaderValue},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use super::handlers::{delete_blob, list_blobs, ping, upload_blob, AppState};
use super::middleware::create_cors_layer;
use crate::config::WebConfig;
use crate::storage::BLOB_DIR;

/// Allowance for multipart framing on top of the maximum upload size.
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the main router.
///
/// Routes:
/// - `POST /api/blob/upload`, `POST /api/blob/delete`
/// - `GET /api/blob/list`, `GET /api/blob/ping`
/// - `GET /blob/*` (stored content, when `serve_blobs` is enabled)
pub fn create_router(app_state: Arc<AppState>, web_config: &WebConfig) -> Router {
    let body_limit = usize::try_from(app_state.settings.max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let api_routes = Router::new()
        .route("/upload", post(upload_blob))
        .route("/delete", post(delete_blob))
        .route("/list", get(list_blobs))
        .route("/ping", get(ping))
        .layer(DefaultBodyLimit::max(body_limit));

    let mut router = Router::new().nest("/api/blob", api_routes);

    if web_config.serve_blobs {
        let blob_root = app_state.store.blob_root().to_path_buf();
        router = router.nest_service(&format!("/{BLOB_DIR}"), ServeDir::new(blob_root));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(create_cors_layer(&web_config.cors_origins))
                .layer(SetResponseHeaderLayer::overriding(
                    X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                )),
        )
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlobSettings;
    use crate::storage::BlobStore;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    fn test_state(temp_dir: &TempDir) -> Arc<AppState> {
        let store = BlobStore::open(temp_dir.path()).unwrap();
        let settings = BlobSettings {
            key: "router-key".to_string(),
            ..BlobSettings::default()
        };
        Arc::new(AppState::new(store, settings))
    }

    #[tokio::test]
    async fn test_serves_stored_blobs() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir);
        state.store.save("pics", "a.png", b"\x89PNG\r\n\x1a\n").unwrap();
        let app = create_router(state, &WebConfig::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/blob/pics/a.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-content-type-options").unwrap(), "nosniff");
    }

    #[tokio::test]
    async fn test_blob_serving_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir);
        state.store.save("", "a.png", b"\x89PNG\r\n\x1a\n").unwrap();
        let web_config = WebConfig {
            serve_blobs: false,
            ..WebConfig::default()
        };
        let app = create_router(state, &web_config);

        let response = app
            .oneshot(Request::builder().uri("/blob/a.png").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ping_requires_key() {
        let temp_dir = TempDir::new().unwrap();
        let app = create_router(test_state(&temp_dir), &WebConfig::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/blob/ping")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
