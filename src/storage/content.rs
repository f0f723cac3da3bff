//! Content type checks for uploads.

/// Lower-cased extension of a client-supplied filename.
///
/// Only the last path segment is considered, and everything after its last
/// `.` is the extension. Returns an empty string when there is none.
pub fn client_extension(original_name: &str) -> String {
    let basename = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    basename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// MIME type detected from the leading bytes of the content.
pub fn sniff_mime(content: &[u8]) -> Option<&'static str> {
    infer::get(content).map(|kind| kind.mime_type())
}

/// Stored name for a new blob: 128 random bits as lower-case hex, plus the
/// extension when there is one.
pub fn generate_blob_name(ext: &str) -> String {
    let basename = hex::encode(rand::random::<[u8; 16]>());
    if ext.is_empty() {
        basename
    } else {
        format!("{basename}.{ext}")
    }
}
