//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. `$GEOQUERY_DATABASE_URL` for the store URL
//! 4. CLI flags (applied by the caller through [`Config::with_database_url`])
//!
//! # Config File Locations
//!
//! Searched in order:
//! 1. Explicit path passed to [`Config::load`]
//! 2. `$GEOQUERY_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/geoquery/config.toml`
//! 4. `~/.geoquery/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use geoquery::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("statement timeout: {:?}", config.statement_timeout());
//! println!("WMS endpoint: {}", config.feature_info_endpoint());
//! ```

pub mod schema;

pub use schema::{FeatureInfoSection, FileConfig, StoreSection};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GEOQUERY_CONFIG";

/// Environment variable overriding the store URL.
pub const DATABASE_URL_ENV: &str = "GEOQUERY_DATABASE_URL";

/// Default WMS endpoint for feature-info requests.
pub const DEFAULT_FEATURE_INFO_ENDPOINT: &str =
    "http://localhost:8080/geoserver/final_project/wms";

/// Default layer queried by feature-info requests.
pub const DEFAULT_FEATURE_INFO_LAYER: &str = "final_project:US_STADIUMS";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FEATURE_INFO_TIMEOUT_SECS: u64 = 10;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("no store URL configured; set store.url, GEOQUERY_DATABASE_URL or --database-url")]
    MissingDatabaseUrl,
}

/// Resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed config file contents
    pub file: FileConfig,
    /// Store URL from the environment or CLI, overriding the file
    database_url_override: Option<String>,
    /// Path to the config file (if loaded)
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `explicit` or the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated. Missing config files are not an error (defaults are
    /// used), except for an explicit path, which must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (file, loaded_from) = match explicit {
            Some(path) => (Self::read_file(path)?, Some(path.to_path_buf())),
            None => Self::load_default()?,
        };
        file.validate()?;

        let mut config = Config {
            file,
            database_url_override: None,
            loaded_from,
        };

        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            if !url.trim().is_empty() {
                config = config.with_database_url(url)?;
            }
        }

        Ok(config)
    }

    /// Load from the first default location that exists.
    fn load_default() -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
        for path in Self::candidate_paths() {
            if path.exists() {
                let file = Self::read_file(&path)?;
                return Ok((file, Some(path)));
            }
        }
        Ok((FileConfig::default(), None))
    }

    /// Default search locations, in precedence order.
    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            paths.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_home).join("geoquery/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".geoquery/config.toml"));
        }
        paths
    }

    /// Read and parse a config file.
    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Override the store URL (CLI flag or environment).
    pub fn with_database_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        schema::validate_database_url(&url)?;
        self.database_url_override = Some(url);
        Ok(self)
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Get the store URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingDatabaseUrl` when no source provides one.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url_override
            .as_deref()
            .or_else(|| self.file.store.as_ref().and_then(|s| s.url.as_deref()))
            .ok_or(ConfigError::MissingDatabaseUrl)
    }

    /// Maximum pooled store connections. Defaults to 5.
    pub fn max_connections(&self) -> u32 {
        self.file
            .store
            .as_ref()
            .and_then(|s| s.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Upper bound for a single store call. Defaults to 10 seconds.
    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(
            self.file
                .store
                .as_ref()
                .and_then(|s| s.statement_timeout_secs)
                .unwrap_or(DEFAULT_STATEMENT_TIMEOUT_SECS),
        )
    }

    /// WMS endpoint for feature-info requests.
    pub fn feature_info_endpoint(&self) -> &str {
        self.file
            .feature_info
            .as_ref()
            .and_then(|f| f.endpoint.as_deref())
            .unwrap_or(DEFAULT_FEATURE_INFO_ENDPOINT)
    }

    /// Layer queried by feature-info requests.
    pub fn feature_info_layer(&self) -> &str {
        self.file
            .feature_info
            .as_ref()
            .and_then(|f| f.layer.as_deref())
            .unwrap_or(DEFAULT_FEATURE_INFO_LAYER)
    }

    /// Feature-info request timeout. Defaults to 10 seconds.
    pub fn feature_info_timeout(&self) -> Duration {
        Duration::from_secs(
            self.file
                .feature_info
                .as_ref()
                .and_then(|f| f.timeout_secs)
                .unwrap_or(DEFAULT_FEATURE_INFO_TIMEOUT_SECS),
        )
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply() {
        let config = Config::default();

        assert!(config.database_url().is_err());
        assert_eq!(config.max_connections(), 5);
        assert_eq!(config.statement_timeout(), Duration::from_secs(10));
        assert_eq!(config.feature_info_endpoint(), DEFAULT_FEATURE_INFO_ENDPOINT);
        assert_eq!(config.feature_info_layer(), "final_project:US_STADIUMS");
        assert_eq!(config.feature_info_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [store]
            statement_timeout_secs = 3

            [feature_info]
            layer = "other:LAYER"
            "#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.statement_timeout(), Duration::from_secs(3));
        assert_eq!(config.feature_info_layer(), "other:LAYER");
        assert_eq!(config.loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn missing_explicit_path_is_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[store]\npool = 4\n").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[feature_info]\ntimeout_secs = 0\n").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn override_beats_file() {
        let config = Config {
            file: FileConfig {
                store: Some(StoreSection {
                    url: Some("postgres://file@localhost/a".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(config.database_url().unwrap(), "postgres://file@localhost/a");

        let config = config
            .with_database_url("postgres://flag@localhost/b")
            .unwrap();
        assert_eq!(config.database_url().unwrap(), "postgres://flag@localhost/b");
    }

    #[test]
    fn override_validates_scheme() {
        assert!(Config::default().with_database_url("sqlite://x").is_err());
    }
}
