//! Folder and blob path sanitizing.
//!
//! Two input flavors exist:
//! - folders (`[A-Za-z0-9_/-]`), used by upload and list
//! - blob paths (`[A-Za-z0-9_./-]`), used by delete
//!
//! Blob paths allow `.` for extensions, so `.` and `..` segments are rejected
//! explicitly. [`resolve_under`] refuses anything that is not a plain
//! descendant of the given root.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Rejection reasons for folder and blob path inputs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    /// A character outside the allowed set.
    #[error("contains invalid characters")]
    InvalidCharacters,
    /// A `.` or `..` segment.
    #[error("contains a relative segment")]
    Traversal,
    /// Nothing left after trimming.
    #[error("path is empty")]
    Empty,
    /// The resolved location is not inside the storage root.
    #[error("resolves outside the storage root")]
    OutsideRoot,
}

fn is_folder_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '/'
}

fn is_path_char(c: char) -> bool {
    is_folder_char(c) || c == '.'
}

/// Join the non-empty `/`-separated segments of `input`.
fn collapse_segments(input: &str) -> String {
    input
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Sanitize a folder input.
///
/// Surrounding whitespace and slashes are stripped and repeated slashes are
/// collapsed. The empty string denotes the root folder and is accepted.
pub fn sanitize_folder(input: &str) -> Result<String, PathError> {
    let trimmed = input.trim();
    if !trimmed.chars().all(is_folder_char) {
        return Err(PathError::InvalidCharacters);
    }
    Ok(collapse_segments(trimmed))
}

/// Sanitize a blob path input (delete variant).
pub fn sanitize_blob_path(input: &str) -> Result<String, PathError> {
    let trimmed = input.trim();
    if !trimmed.chars().all(is_path_char) {
        return Err(PathError::InvalidCharacters);
    }

    let collapsed = collapse_segments(trimmed);
    if collapsed.is_empty() {
        return Err(PathError::Empty);
    }
    if collapsed.split('/').any(|s| s == "." || s == "..") {
        return Err(PathError::Traversal);
    }
    Ok(collapsed)
}

/// Join a sanitized relative path onto `root`.
///
/// Only normal components are accepted; anything that could step out of
/// `root` (parent, root or prefix components) is an error.
pub fn resolve_under(root: &Path, relative: &str) -> Result<PathBuf, PathError> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return Err(PathError::OutsideRoot),
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_folder_accepts_valid() {
        assert_eq!(sanitize_folder("avatars").unwrap(), "avatars");
        assert_eq!(sanitize_folder("  users/42/avatars  ").unwrap(), "users/42/avatars");
        assert_eq!(sanitize_folder("/a-b/c_d/").unwrap(), "a-b/c_d");
        assert_eq!(sanitize_folder("a//b").unwrap(), "a/b");
    }

    #[test]
    fn test_sanitize_folder_root() {
        assert_eq!(sanitize_folder("").unwrap(), "");
        assert_eq!(sanitize_folder("   ").unwrap(), "");
        assert_eq!(sanitize_folder("///").unwrap(), "");
    }

    #[test]
    fn test_sanitize_folder_rejects_invalid() {
        assert_eq!(sanitize_folder("../etc"), Err(PathError::InvalidCharacters));
        assert_eq!(sanitize_folder("..\\etc"), Err(PathError::InvalidCharacters));
        assert_eq!(sanitize_folder("a b"), Err(PathError::InvalidCharacters));
        assert_eq!(sanitize_folder("photos.2024"), Err(PathError::InvalidCharacters));
        assert_eq!(sanitize_folder("ümlaut"), Err(PathError::InvalidCharacters));
    }

    #[test]
    fn test_sanitize_blob_path_accepts_valid() {
        assert_eq!(sanitize_blob_path("abc.png").unwrap(), "abc.png");
        assert_eq!(
            sanitize_blob_path(" /avatars/abc.png/ ").unwrap(),
            "avatars/abc.png"
        );
        assert_eq!(sanitize_blob_path("a/..b/c..png").unwrap(), "a/..b/c..png");
    }

    #[test]
    fn test_sanitize_blob_path_rejects_traversal() {
        assert_eq!(sanitize_blob_path("../.env"), Err(PathError::Traversal));
        assert_eq!(sanitize_blob_path("a/../../meta/x.json"), Err(PathError::Traversal));
        assert_eq!(sanitize_blob_path("a/./b.png"), Err(PathError::Traversal));
        assert_eq!(sanitize_blob_path(".."), Err(PathError::Traversal));
        assert_eq!(
            sanitize_blob_path("..\\..\\secret"),
            Err(PathError::InvalidCharacters)
        );
    }

    #[test]
    fn test_sanitize_blob_path_rejects_empty() {
        assert_eq!(sanitize_blob_path(""), Err(PathError::Empty));
        assert_eq!(sanitize_blob_path(" / "), Err(PathError::Empty));
    }

    #[test]
    fn test_resolve_under() {
        let root = Path::new("/srv/blob");
        assert_eq!(
            resolve_under(root, "a/b.png").unwrap(),
            PathBuf::from("/srv/blob/a/b.png")
        );
        assert_eq!(resolve_under(root, "").unwrap(), PathBuf::from("/srv/blob"));
        assert_eq!(resolve_under(root, "a/../b"), Err(PathError::OutsideRoot));
        assert_eq!(resolve_under(root, "/etc/passwd"), Err(PathError::OutsideRoot));
    }
}
