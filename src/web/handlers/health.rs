//! Health check handler.

use axum::Json;
use chrono::Utc;

use crate::storage::format_timestamp;
use crate::web::dto::PingResponse;
use crate::web::middleware::BlobKey;

/// GET /api/blob/ping - Liveness check.
pub async fn ping(_key: BlobKey) -> Json<PingResponse> {
    Json(PingResponse {
        success: true,
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        time: format_timestamp(&Utc::now()),
    })
}
