//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Identity provider configuration.
    pub identity: IdentityConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// External identity provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the identity provider API.
    pub provider_url: String,
    /// Server-side API key used to fetch profile attributes.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_identity_timeout")]
    pub timeout_secs: u64,
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory uploaded files are written to.
    #[serde(default = "default_storage_path")]
    pub base_path: PathBuf,
    /// URL prefix files are served under.
    #[serde(default = "default_storage_url")]
    pub base_url: String,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            base_path: default_storage_path(),
            base_url: default_storage_url(),
            max_upload_bytes: default_max_upload(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    50
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_identity_timeout() -> u64 {
    10
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./files")
}

fn default_storage_url() -> String {
    "/files".to_string()
}

const fn default_max_upload() -> usize {
    10 * 1024 * 1024
}

fn default_log_filter() -> String {
    "travelboard=debug,tower_http=debug".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `TRAVELBOARD_ENV`)
    /// 3. Environment variables with `TRAVELBOARD__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("TRAVELBOARD_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TRAVELBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("TRAVELBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_sections() {
        let raw = r#"
            [server]
            url = "https://boards.example.com"

            [database]
            url = "postgres://localhost/travelboard"

            [identity]
            provider_url = "https://auth.example.com"
        "#;

        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .and_then(config::Config::try_deserialize)
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 50);
        assert_eq!(config.identity.timeout_secs, 10);
        assert!(config.identity.api_key.is_none());
        assert_eq!(config.storage.base_url, "/files");
        assert!(!config.logging.json);
    }
}
