//! API error handling for the blob endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing or wrong shared key (403).
    InvalidKey,
    /// No file part in the upload (400).
    NoFile,
    /// Bad or unknown folder (400).
    FolderInvalid,
    /// Extension or sniffed content type not allowed (400).
    InvalidType,
    /// Upload above the configured maximum (400).
    FileTooLarge,
    /// Malformed request body or missing fields (400).
    InvalidRequest,
    /// Bad or escaping blob path (400).
    InvalidPath,
    /// Blob does not exist (404).
    FileNotFound,
    /// Blob removal failed (500).
    DeleteFailed,
    /// Any other server-side failure (500).
    ServerError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidKey => StatusCode::FORBIDDEN,
            ErrorCode::NoFile
            | ErrorCode::FolderInvalid
            | ErrorCode::InvalidType
            | ErrorCode::FileTooLarge
            | ErrorCode::InvalidRequest
            | ErrorCode::InvalidPath => StatusCode::BAD_REQUEST,
            ErrorCode::FileNotFound => StatusCode::NOT_FOUND,
            ErrorCode::DeleteFailed | ErrorCode::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_key() -> Self {
        Self::new(ErrorCode::InvalidKey, "Forbidden")
    }

    pub fn no_file(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoFile, message)
    }

    pub fn folder_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::FolderInvalid, message)
    }

    pub fn invalid_type() -> Self {
        Self::new(ErrorCode::InvalidType, "Unsupported file type")
    }

    pub fn file_too_large() -> Self {
        Self::new(ErrorCode::FileTooLarge, "File exceeds maximum allowed size")
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPath, message)
    }

    pub fn file_not_found() -> Self {
        Self::new(ErrorCode::FileNotFound, "File not found")
    }

    pub fn delete_failed() -> Self {
        Self::new(ErrorCode::DeleteFailed, "Failed to delete file")
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServerError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
