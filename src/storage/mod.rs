//! Blob storage for Halal Blob.
//!
//! This module provides the filesystem side of the service:
//! - folder and blob path sanitizing
//! - blob content storage with random hex names
//! - JSON metadata sidecars kept in a parallel tree
//! - content type sniffing

mod content;
mod metadata;
mod path;
mod store;

pub use content::{client_extension, generate_blob_name, sniff_mime};
pub use metadata::{format_timestamp, BlobMetadata, MetadataStore};
pub use path::{resolve_under, sanitize_blob_path, sanitize_folder, PathError};
pub use store::{public_url, relative_path, BlobStore, StoredBlob, BLOB_DIR, META_DIR};
