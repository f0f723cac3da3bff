//! Middleware for the blob API.

pub mod auth;
pub mod cors;

pub use auth::{key_matches, presented_key, BlobKey, KEY_HEADER, KEY_QUERY_PARAM};
pub use cors::create_cors_layer;
