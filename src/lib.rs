//! Halal Blob - a minimal key-authenticated file drop.
//!
//! Files are stored under `blob/` with a JSON metadata sidecar under `meta/`,
//! and managed through a small JSON HTTP API.

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod web;

pub use config::{BlobSettings, Config};
pub use error::{BlobError, Result};
pub use storage::{BlobMetadata, BlobStore, PathError};
pub use web::{create_router, AppState, BlobServer};
