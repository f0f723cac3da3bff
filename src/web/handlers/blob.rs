//! Blob handlers: upload, delete and list.

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        ConnectInfo, Multipart, Query, State,
    },
    http::{HeaderMap, StatusCode, Uri},
    Json,
};
use chrono::Utc;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::storage::{
    client_extension, format_timestamp, generate_blob_name, public_url, sanitize_blob_path,
    sanitize_folder, sniff_mime, BlobMetadata,
};
use crate::web::dto::{
    DeleteRequest, FileEntry, ListQuery, ListResponse, SuccessResponse, UploadMeta,
    UploadResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::BlobKey;
use crate::BlobError;

/// Map a multipart transfer error to the upload taxonomy.
fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::debug!("Upload body over limit: {}", err);
        ApiError::file_too_large()
    } else {
        tracing::debug!("Failed to read multipart data: {}", err);
        ApiError::no_file("No file uploaded")
    }
}

/// POST /api/blob/upload - Store a file.
///
/// Request body: multipart/form-data with a `file` part and an optional
/// `folder` field.
pub async fn upload_blob(
    _key: BlobKey,
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected upload body: {}", e);
        ApiError::no_file("No file uploaded")
    })?;

    let mut upload: Option<(String, Bytes)> = None;
    let mut folder_input = String::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let original_name = field.file_name().unwrap_or("").to_string();
                let content = field.bytes().await.map_err(multipart_error)?;
                if !original_name.is_empty() {
                    upload = Some((original_name, content));
                }
            }
            "folder" => {
                folder_input = field.text().await.map_err(multipart_error)?;
            }
            _ => {}
        }
    }

    let (original_name, content) = upload.ok_or_else(|| ApiError::no_file("No file uploaded"))?;

    let folder = sanitize_folder(&folder_input)
        .map_err(|_| ApiError::folder_invalid("Folder contains invalid characters"))?;

    state.store.ensure_folder(&folder).map_err(|e| {
        tracing::error!(folder = %folder, "Failed to create target directory: {}", e);
        ApiError::server_error("Failed to create target directory")
    })?;

    let ext = client_extension(&original_name);
    let mime_type = match sniff_mime(&content) {
        Some(mime) if state.settings.allows_extension(&ext) && state.allows_mime(mime) => mime,
        sniffed => {
            tracing::debug!(
                ext = %ext,
                sniffed = sniffed.unwrap_or("unknown"),
                "Rejected upload type"
            );
            return Err(ApiError::invalid_type());
        }
    };

    let size_bytes = content.len() as u64;
    if size_bytes > state.settings.max_bytes {
        return Err(ApiError::file_too_large());
    }

    let filename = generate_blob_name(&ext);
    let path = state
        .store
        .save(&folder, &filename, &content)
        .map_err(|e| {
            tracing::error!(folder = %folder, "Failed to save file: {}", e);
            ApiError::server_error("Failed to save file")
        })?;

    let url = public_url(&state.base_url(&headers, &uri), &path);
    let meta = BlobMetadata {
        path: path.clone(),
        url: url.clone(),
        size_bytes,
        mime_type: mime_type.to_string(),
        original_name,
        uploaded_at: format_timestamp(&Utc::now()),
        client_ip: connect_info
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_default(),
        folder,
    };

    // The saved blob stays in place if this fails.
    state.store.metadata().write(&meta).map_err(|e| {
        tracing::error!(path = %path, "Failed to write metadata: {}", e);
        ApiError::server_error("Failed to write metadata")
    })?;

    tracing::info!(path = %path, size_bytes, mime_type, "Stored blob");

    Ok(Json(UploadResponse {
        success: true,
        url,
        filename,
        path,
        meta: UploadMeta::from(&meta),
    }))
}

/// POST /api/blob/delete - Remove a file and its metadata.
///
/// Request body: `{"path": "..."}` or `{"filename": "..."}`.
pub async fn delete_blob(
    _key: BlobKey,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, ApiError> {
    let request =
        DeleteRequest::from_json(&body).ok_or_else(|| ApiError::invalid_request("Invalid JSON"))?;

    let target = request
        .target()
        .ok_or_else(|| ApiError::invalid_request("Missing path or filename"))?;

    let relative =
        sanitize_blob_path(target).map_err(|e| ApiError::invalid_path(format!("Path {e}")))?;

    state.store.delete(&relative).map_err(|e| match e {
        BlobError::NotFound(_) => ApiError::file_not_found(),
        BlobError::Path(e) => ApiError::invalid_path(format!("Path {e}")),
        e => {
            tracing::error!(path = %relative, "Failed to delete file: {}", e);
            ApiError::delete_failed()
        }
    })?;

    tracing::info!(path = %relative, "Deleted blob");

    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/blob/list - List the files directly inside a folder.
///
/// Query: `folder`, `page`, `per_page`. A repeated name keeps its last value.
pub async fn list_blobs(
    _key: BlobKey,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<ListResponse>, ApiError> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&uri).map_err(|e| {
        tracing::debug!("Rejected list query: {}", e.body_text());
        ApiError::folder_invalid("Invalid folder")
    })?;
    let query = ListQuery::from(params);

    let folder = sanitize_folder(query.folder.as_deref().unwrap_or(""))
        .map_err(|_| ApiError::folder_invalid("Invalid folder"))?;
    let page = query.page();
    let per_page = query.per_page();

    let blobs = state.store.list_folder(&folder).map_err(|e| match e {
        BlobError::NotFound(_) => ApiError::folder_invalid("Folder not found"),
        e => {
            tracing::error!(folder = %folder, "Failed to list folder: {}", e);
            ApiError::server_error("Failed to list folder")
        }
    })?;

    let total = blobs.len() as u64;
    let offset = (u64::from(page) - 1).saturating_mul(u64::from(per_page));
    let base_url = state.base_url(&headers, &uri);

    let files = blobs
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(per_page as usize)
        .map(|blob| FileEntry {
            url: public_url(&base_url, &blob.path),
            path: blob.path,
            meta: blob.metadata,
        })
        .collect();

    Ok(Json(ListResponse {
        success: true,
        folder,
        page,
        per_page,
        total,
        files,
    }))
}
