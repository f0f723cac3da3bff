//! Response DTOs for the blob API.

use serde::Serialize;

use crate::storage::BlobMetadata;

/// Bare success acknowledgement.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Always `true`.
    pub success: bool,
    /// Absolute download URL.
    pub url: String,
    /// Generated stored name.
    pub filename: String,
    /// Path relative to the blob root.
    pub path: String,
    /// Echo of the stored metadata.
    pub meta: UploadMeta,
}

/// Metadata fields echoed by the upload response.
#[derive(Debug, Serialize)]
pub struct UploadMeta {
    pub size_bytes: u64,
    pub mime_type: String,
    pub uploaded_at: String,
    pub folder: String,
    pub original_name: String,
    pub client_ip: String,
}

impl From<&BlobMetadata> for UploadMeta {
    fn from(meta: &BlobMetadata) -> Self {
        Self {
            size_bytes: meta.size_bytes,
            mime_type: meta.mime_type.clone(),
            uploaded_at: meta.uploaded_at.clone(),
            folder: meta.folder.clone(),
            original_name: meta.original_name.clone(),
            client_ip: meta.client_ip.clone(),
        }
    }
}

/// One entry of a folder listing.
#[derive(Debug, Serialize)]
pub struct FileEntry {
    /// Path relative to the blob root.
    pub path: String,
    /// Absolute download URL.
    pub url: String,
    /// Sidecar metadata, `null` when missing or unreadable.
    pub meta: Option<BlobMetadata>,
}

/// Folder listing response.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    /// Always `true`.
    pub success: bool,
    /// Sanitized folder that was listed.
    pub folder: String,
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of files in the folder.
    pub total: u64,
    /// Files on this page.
    pub files: Vec<FileEntry>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct PingResponse {
    /// Always `true`.
    pub success: bool,
    /// Always `"ok"`.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Current server time (RFC 3339, UTC).
    pub time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_null_meta() {
        let entry = FileEntry {
            path: "a.png".to_string(),
            url: "https://h/blob/a.png".to_string(),
            meta: None,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value["meta"].is_null());
    }

    #[test]
    fn test_success_response() {
        let json = serde_json::to_string(&SuccessResponse::ok()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }
}
