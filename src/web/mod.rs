//! Web API module for Halal Blob.
//!
//! Exposes upload, delete, list and ping endpoints under `/api/blob/`, all
//! guarded by the shared key, and optionally serves stored content under
//! `/blob/`.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::{ApiError, ErrorCode};
pub use handlers::AppState;
pub use router::create_router;
pub use server::BlobServer;
