//! Filesystem blob store.
//!
//! Layout under the storage root:
//! ```text
//! {root}/
//! ├── blob/
//! │   └── avatars/
//! │       └── 3f2a...9c.png
//! └── meta/
//!     └── avatars/
//!         └── 3f2a...9c.png.json
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::metadata::{BlobMetadata, MetadataStore};
use super::path::{resolve_under, PathError};
use crate::{BlobError, Result};

/// Directory name of the content tree.
pub const BLOB_DIR: &str = "blob";

/// Directory name of the sidecar tree.
pub const META_DIR: &str = "meta";

/// A blob found while listing a folder.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    /// Path relative to the blob root.
    pub path: String,
    /// Sidecar contents, `None` when missing or unreadable.
    pub metadata: Option<BlobMetadata>,
}

/// Relative path of `name` inside `folder`.
pub fn relative_path(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{folder}/{name}")
    }
}

/// Public download URL for a relative blob path.
pub fn public_url(base_url: &str, relative: &str) -> String {
    format!("{}/{BLOB_DIR}/{relative}", base_url.trim_end_matches('/'))
}

/// Blob content plus sidecar metadata on the local filesystem.
#[derive(Debug, Clone)]
pub struct BlobStore {
    blob_root: PathBuf,
    metadata: MetadataStore,
}

impl BlobStore {
    /// Open a store under `root`, creating `blob/` and `meta/` if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let blob_root = root.join(BLOB_DIR);
        fs::create_dir_all(&blob_root)?;
        let metadata = MetadataStore::new(root.join(META_DIR))?;

        Ok(Self {
            blob_root,
            metadata,
        })
    }

    /// Root directory of the content tree.
    pub fn blob_root(&self) -> &Path {
        &self.blob_root
    }

    /// Sidecar store.
    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Absolute path of a relative blob path or folder.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        Ok(resolve_under(&self.blob_root, relative)?)
    }

    /// Create the directory for `folder` if it doesn't exist.
    ///
    /// Safe to race with another request creating the same directory.
    pub fn ensure_folder(&self, folder: &str) -> Result<PathBuf> {
        let dir = self.resolve(folder)?;
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Write blob content and return its relative path.
    pub fn save(&self, folder: &str, name: &str, content: &[u8]) -> Result<String> {
        let relative = relative_path(folder, name);
        let target = self.resolve(&relative)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, content)?;
        Ok(relative)
    }

    /// Resolve a relative path to an existing regular file inside the blob
    /// root, following symlinks.
    pub fn existing_file(&self, relative: &str) -> Result<PathBuf> {
        let path = self.resolve(relative)?;

        let is_file = match fs::metadata(&path) {
            Ok(m) => m.is_file(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };
        if !is_file {
            return Err(BlobError::NotFound(format!("blob {relative}")));
        }

        let canonical = path.canonicalize()?;
        if !canonical.starts_with(self.blob_root.canonicalize()?) {
            return Err(PathError::OutsideRoot.into());
        }
        Ok(path)
    }

    /// Delete a blob, then its sidecar.
    ///
    /// The sidecar removal is best effort: its failure is logged, not
    /// returned.
    pub fn delete(&self, relative: &str) -> Result<()> {
        let path = self.existing_file(relative)?;
        fs::remove_file(&path)?;

        if let Err(e) = self.metadata.remove(relative) {
            tracing::debug!(path = %relative, error = %e, "Leaving orphaned metadata sidecar");
        }
        Ok(())
    }

    /// Direct regular-file children of `folder`, sorted by path.
    ///
    /// Subdirectories are skipped. A folder that doesn't exist is
    /// `NotFound`.
    pub fn list_folder(&self, folder: &str) -> Result<Vec<StoredBlob>> {
        let dir = self.resolve(folder)?;
        if !dir.is_dir() {
            return Err(BlobError::NotFound(format!("folder {folder:?}")));
        }

        let mut blobs = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };

            let path = relative_path(folder, &name);
            let metadata = self.metadata.read(&path);
            blobs.push(StoredBlob { path, metadata });
        }

        blobs.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(blobs)
    }
}
