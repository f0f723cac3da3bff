//! Sidecar metadata for stored blobs.
//!
//! Every blob at `blob/<rel>` may have a JSON sidecar at `meta/<rel>.json`.
//! A missing or unreadable sidecar is a tolerated state: readers get `None`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::path::resolve_under;
use crate::Result;

/// Descriptive fields stored next to a blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    /// Path relative to the blob root.
    pub path: String,
    /// Absolute download URL.
    pub url: String,
    /// Content size in bytes.
    pub size_bytes: u64,
    /// MIME type sniffed from the content.
    pub mime_type: String,
    /// Client-supplied filename, stored verbatim.
    pub original_name: String,
    /// Upload time (RFC 3339, UTC).
    pub uploaded_at: String,
    /// Uploader address, empty when unknown.
    pub client_ip: String,
    /// Sanitized folder, empty for the root.
    pub folder: String,
}

/// Format a timestamp the way `uploaded_at` stores it.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Sidecar store rooted at the `meta/` directory.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    root: PathBuf,
}

impl MetadataStore {
    /// Create a store, creating the root directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory of the sidecar tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sidecar location for a blob's relative path.
    pub fn sidecar_path(&self, relative: &str) -> Result<PathBuf> {
        let blob_path = resolve_under(&self.root, relative)?;
        let mut sidecar = blob_path.into_os_string();
        sidecar.push(".json");
        Ok(PathBuf::from(sidecar))
    }

    /// Write the sidecar for `meta.path`, creating directories as needed.
    pub fn write(&self, meta: &BlobMetadata) -> Result<()> {
        let sidecar = self.sidecar_path(&meta.path)?;
        if let Some(parent) = sidecar.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(meta)?;
        fs::write(&sidecar, body)?;
        Ok(())
    }

    /// Load the sidecar for a blob, if present and well-formed.
    pub fn read(&self, relative: &str) -> Option<BlobMetadata> {
        let sidecar = self.sidecar_path(relative).ok()?;
        let raw = match fs::read(&sidecar) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %relative, error = %e, "Failed to read metadata sidecar");
                return None;
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::warn!(path = %relative, error = %e, "Ignoring corrupt metadata sidecar");
                None
            }
        }
    }

    /// Remove the sidecar for a blob.
    ///
    /// Returns `false` if there was nothing to remove.
    pub fn remove(&self, relative: &str) -> Result<bool> {
        let sidecar = self.sidecar_path(relative)?;
        match fs::remove_file(&sidecar) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
