//! Configuration module for Halal Blob.
//!
//! Two layers are involved:
//! - [`Config`]: the server process configuration (`config.toml`).
//! - [`BlobSettings`]: the blob service settings read from the `.env` file in
//!   the storage root, overridable by process environment variables.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::{BlobError, Result};

/// Environment key holding the shared secret.
pub const ENV_KEY: &str = "HALAL_BLOB_KEY";
/// Environment key holding the public base URL.
pub const ENV_BASE_URL: &str = "HALAL_BLOB_BASE_URL";
/// Environment key holding the maximum upload size in megabytes.
pub const ENV_MAX_MB: &str = "HALAL_BLOB_MAX_MB";
/// Environment key holding the comma separated extension allow-list.
pub const ENV_ALLOWED_EXT: &str = "HALAL_BLOB_ALLOWED_EXT";

/// Default maximum upload size in megabytes.
pub const DEFAULT_MAX_MB: f64 = 5.0;

/// Default extension allow-list.
pub const DEFAULT_ALLOWED_EXT: &str = "jpg,jpeg,png,webp,gif";

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Storage root holding `blob/`, `meta/` and the `.env` file.
    #[serde(default = "default_storage_root")]
    pub root: String,
}

fn default_storage_root() -> String {
    "data".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

impl StorageConfig {
    /// Path of the `.env` file carrying the blob settings.
    pub fn env_path(&self) -> std::path::PathBuf {
        Path::new(&self.root).join(".env")
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/halal-blob.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Web configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether stored blobs are served under `/blob/`.
    #[serde(default = "default_serve_blobs")]
    pub serve_blobs: bool,
}

fn default_serve_blobs() -> bool {
    true
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            serve_blobs: default_serve_blobs(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(BlobError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| BlobError::Config(format!("config parse error: {e}")))
    }
}

/// Blob service settings.
///
/// An empty `key` is a valid value: the service still starts, and every
/// request then fails authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobSettings {
    /// Shared secret required on every request.
    pub key: String,
    /// Base URL for download links, without trailing slash.
    pub base_url: Option<String>,
    /// Maximum upload size in bytes.
    pub max_bytes: u64,
    /// Allowed lower-case file extensions.
    pub allowed_exts: Vec<String>,
}

impl Default for BlobSettings {
    fn default() -> Self {
        Self {
            key: String::new(),
            base_url: None,
            max_bytes: mb_to_bytes(DEFAULT_MAX_MB),
            allowed_exts: parse_extensions(DEFAULT_ALLOWED_EXT),
        }
    }
}

impl BlobSettings {
    /// Load settings from an `.env` file, with process environment variables
    /// taking precedence over the file.
    ///
    /// A missing or unreadable file is not an error.
    pub fn load<P: AsRef<Path>>(env_path: P) -> Self {
        let file_vars = read_env_file(env_path.as_ref());
        Self::from_lookup(|name| std::env::var(name).ok().or_else(|| file_vars.get(name).cloned()))
    }

    /// Build settings from an arbitrary key/value lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = lookup(ENV_KEY)
            .map(|k| k.trim().to_string())
            .unwrap_or_default();

        let base_url = lookup(ENV_BASE_URL)
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());

        let max_mb = lookup(ENV_MAX_MB)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|mb| mb.is_finite() && *mb >= 0.0)
            .unwrap_or(DEFAULT_MAX_MB);

        let allowed_exts = lookup(ENV_ALLOWED_EXT)
            .filter(|v| !v.is_empty())
            .map(|v| parse_extensions(&v))
            .unwrap_or_else(|| parse_extensions(DEFAULT_ALLOWED_EXT));

        Self {
            key,
            base_url,
            max_bytes: mb_to_bytes(max_mb),
            allowed_exts,
        }
    }

    /// Whether a shared secret is configured at all.
    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }

    /// Whether `ext` (already lower-cased) is in the extension allow-list.
    pub fn allows_extension(&self, ext: &str) -> bool {
        self.allowed_exts.iter().any(|e| e == ext)
    }

    /// MIME types matching the allowed extensions.
    pub fn allowed_mime_types(&self) -> Vec<String> {
        let mut mimes: Vec<String> = self
            .allowed_exts
            .iter()
            .filter_map(|ext| mime_guess::from_ext(ext).first_raw())
            .map(str::to_string)
            .collect();
        mimes.sort();
        mimes.dedup();
        mimes
    }
}

fn mb_to_bytes(mb: f64) -> u64 {
    (mb * 1024.0 * 1024.0).round() as u64
}

fn parse_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn read_env_file(path: &Path) -> HashMap<String, String> {
    match dotenvy::from_path_iter(path) {
        Ok(iter) => iter.filter_map(|item| item.ok()).collect(),
        Err(e) => {
            tracing::debug!("No blob settings file at {}: {}", path.display(), e);
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.root, "data");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/halal-blob.log");
        assert!(config.web.cors_origins.is_empty());
        assert!(config.web.serve_blobs);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[storage]
root = "/srv/blob"

[logging]
level = "debug"
file = "custom/blob.log"

[web]
cors_origins = ["https://app.example.com"]
serve_blobs = false
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.root, "/srv/blob");
        assert_eq!(config.storage.env_path(), Path::new("/srv/blob/.env"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/blob.log");
        assert_eq!(config.web.cors_origins, vec!["https://app.example.com"]);
        assert!(!config.web.serve_blobs);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.root, "data");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        if let Err(BlobError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(BlobError::Io(_))));
    }

    #[test]
    fn test_blob_settings_defaults() {
        let settings = BlobSettings::from_lookup(|_| None);

        assert!(!settings.has_key());
        assert_eq!(settings.base_url, None);
        assert_eq!(settings.max_bytes, 5 * 1024 * 1024);
        assert_eq!(
            settings.allowed_exts,
            vec!["jpg", "jpeg", "png", "webp", "gif"]
        );
        assert_eq!(settings, BlobSettings::default());
    }

    #[test]
    fn test_blob_settings_values() {
        let settings = BlobSettings::from_lookup(lookup_from(&[
            (ENV_KEY, "  s3cret  "),
            (ENV_BASE_URL, " https://blob.example.com/ "),
            (ENV_MAX_MB, "0.5"),
            (ENV_ALLOWED_EXT, " PNG, ,Gif "),
        ]));

        assert_eq!(settings.key, "s3cret");
        assert_eq!(settings.base_url.as_deref(), Some("https://blob.example.com"));
        assert_eq!(settings.max_bytes, 512 * 1024);
        assert_eq!(settings.allowed_exts, vec!["png", "gif"]);
    }

    #[test]
    fn test_blob_settings_fallbacks() {
        let settings = BlobSettings::from_lookup(lookup_from(&[
            (ENV_KEY, "   "),
            (ENV_BASE_URL, "/"),
            (ENV_MAX_MB, "lots"),
            (ENV_ALLOWED_EXT, ""),
        ]));

        assert!(!settings.has_key());
        assert_eq!(settings.base_url, None);
        assert_eq!(settings.max_bytes, 5 * 1024 * 1024);
        assert_eq!(settings.allowed_exts.len(), 5);
    }

    #[test]
    fn test_negative_max_mb_uses_default() {
        let settings = BlobSettings::from_lookup(lookup_from(&[(ENV_MAX_MB, "-3")]));
        assert_eq!(settings.max_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_allowed_mime_types() {
        let settings = BlobSettings::default();
        assert_eq!(
            settings.allowed_mime_types(),
            vec!["image/gif", "image/jpeg", "image/png", "image/webp"]
        );

        let settings = BlobSettings::from_lookup(lookup_from(&[(ENV_ALLOWED_EXT, "png,nosuchext")]));
        assert_eq!(settings.allowed_mime_types(), vec!["image/png"]);
    }

    #[test]
    fn test_allows_extension() {
        let settings = BlobSettings::default();
        assert!(settings.allows_extension("jpeg"));
        assert!(!settings.allows_extension("php"));
        assert!(!settings.allows_extension(""));
    }

    #[test]
    fn test_load_from_env_file() {
        let temp_dir = TempDir::new().unwrap();
        let env_path = temp_dir.path().join(".env");
        std::fs::write(
            &env_path,
            "HALAL_BLOB_BASE_URL=\"https://files.example.org/\"\nHALAL_BLOB_MAX_MB=\"2\"\n",
        )
        .unwrap();

        let settings = BlobSettings::load(&env_path);

        assert_eq!(settings.base_url.as_deref(), Some("https://files.example.org"));
        assert_eq!(settings.max_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_load_missing_env_file() {
        let temp_dir = TempDir::new().unwrap();
        let settings = BlobSettings::load(temp_dir.path().join("missing.env"));
        assert_eq!(settings.allowed_exts.len(), 5);
    }
}
