//! Fragments configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main Fragments configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FragmentsConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Basic authentication users
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

impl FragmentsConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Render the configuration as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,

    /// Allowed CORS origins (empty allows any origin)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_body_bytes: 5 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

/// Which storage implementation backs both namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackendKind {
    /// Process-local maps, lost on restart
    #[default]
    Memory,
    /// One file per fragment under `base_dir`
    Fs,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend kind
    pub backend: StorageBackendKind,

    /// Base directory for the file-backed store
    pub base_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::Memory,
            base_dir: dirs_next::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("fragments"),
        }
    }
}

/// HTTP Basic authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Known users
    pub users: Vec<BasicUser>,
}

/// A user allowed to authenticate with HTTP Basic credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicUser {
    /// Login email
    pub email: String,

    /// Lowercase hex SHA-256 of the password
    pub password_sha256: String,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Emit JSON log lines instead of human-readable output
    pub json: bool,
}
