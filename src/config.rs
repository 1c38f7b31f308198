//! Configuration module for Filebox.

use serde::Deserialize;
use std::path::Path;

use crate::{FileboxError, Result};

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for the API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    5000
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file holding the catalog, sessions and jobs.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/files_manager.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Blob storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Root directory for stored blobs and thumbnails.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Maximum request body size in megabytes (uploads are base64 in JSON).
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_path() -> String {
    "/tmp/files_manager".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

impl FilesConfig {
    /// Upload limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize) * 1024 * 1024
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    /// Interval between purges of expired sessions.
    #[serde(default = "default_session_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_session_ttl() -> u64 {
    24 * 60 * 60
}

fn default_session_cleanup_interval() -> u64 {
    3600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
            cleanup_interval_secs: default_session_cleanup_interval(),
        }
    }
}

/// Thumbnail worker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Run the thumbnail worker inside the API process.
    #[serde(default = "default_worker_embedded")]
    pub embedded: bool,
    /// Delay between queue polls when no job is pending.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_worker_embedded() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    500
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            embedded: default_worker_embedded(),
            poll_interval_ms: default_poll_interval(),
        }
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
    "logs/filebox.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Thumbnail worker configuration.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| FileboxError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides.
    ///
    /// Recognized: `FILEBOX_HOST`, `FILEBOX_PORT`, `FILEBOX_DB_PATH`, `FOLDER_PATH`.
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(host) = non_empty_env("FILEBOX_HOST") {
            self.web.host = host;
        }
        if let Some(port) = non_empty_env("FILEBOX_PORT") {
            match port.parse() {
                Ok(port) => self.web.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid FILEBOX_PORT"),
            }
        }
        if let Some(path) = non_empty_env("FILEBOX_DB_PATH") {
            self.database.path = path;
        }
        if let Some(path) = non_empty_env("FOLDER_PATH") {
            self.files.storage_path = path;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.files.storage_path.trim().is_empty() {
            return Err(FileboxError::Config(
                "files.storage_path must not be empty".to_string(),
            ));
        }
        if self.session.ttl_secs == 0 {
            return Err(FileboxError::Config(
                "session.ttl_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 5000);
        assert_eq!(config.database.path, "data/files_manager.db");
        assert_eq!(config.files.storage_path, "/tmp/files_manager");
        assert_eq!(config.session.ttl_secs, 86400);
        assert!(config.worker.embedded);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[web]
host = "127.0.0.1"
port = 8080
cors_origins = ["http://localhost:3000"]

[database]
path = "custom/catalog.db"

[files]
storage_path = "custom/blobs"
max_upload_size_mb = 20

[session]
ttl_secs = 600
cleanup_interval_secs = 60

[worker]
embedded = false
poll_interval_ms = 250

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.web.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.database.path, "custom/catalog.db");
        assert_eq!(config.files.storage_path, "custom/blobs");
        assert_eq!(config.files.max_upload_bytes(), 20 * 1024 * 1024);
        assert_eq!(config.session.ttl_secs, 600);
        assert_eq!(config.session.cleanup_interval_secs, 60);
        assert!(!config.worker.embedded);
        assert_eq!(config.worker.poll_interval_ms, 250);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[web]
port = 3000
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.web.port, 3000);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.files.storage_path, "/tmp/files_manager");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        match result {
            Err(FileboxError::Config(msg)) => assert!(msg.contains("config parse error")),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(FileboxError::Io(_))));
    }

    #[test]
    fn test_apply_env_overrides_folder_path() {
        let original = std::env::var("FOLDER_PATH").ok();

        std::env::set_var("FOLDER_PATH", "/srv/blobs");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.files.storage_path, "/srv/blobs");

        std::env::set_var("FOLDER_PATH", "");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.files.storage_path, "/tmp/files_manager");

        match original {
            Some(val) => std::env::set_var("FOLDER_PATH", val),
            None => std::env::remove_var("FOLDER_PATH"),
        }
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.files.storage_path = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.session.ttl_secs = 0;
        assert!(config.validate().is_err());
    }
}
