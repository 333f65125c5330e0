//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Config File
//!
//! Located at (in order of precedence):
//! 1. `--config <path>` if given
//! 2. `$GEOQUERY_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/geoquery/config.toml`
//! 4. `~/.geoquery/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing: timeouts and pool sizes must
//! be positive, URLs must use the expected scheme.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// [store]
/// url = "postgres://gis@localhost/football"
/// max_connections = 5
/// statement_timeout_secs = 10
///
/// [feature_info]
/// endpoint = "http://localhost:8080/geoserver/final_project/wms"
/// layer = "final_project:US_STADIUMS"
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Spatial store connection settings
    pub store: Option<StoreSection>,

    /// Upstream WMS feature-info settings
    pub feature_info: Option<FeatureInfoSection>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(store) = &self.store {
            store.validate()?;
        }
        if let Some(feature_info) = &self.feature_info {
            feature_info.validate()?;
        }
        Ok(())
    }
}

/// `[store]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    /// PostgreSQL connection URL
    pub url: Option<String>,

    /// Maximum pooled connections
    pub max_connections: Option<u32>,

    /// Upper bound for a single store call, in seconds
    pub statement_timeout_secs: Option<u64>,
}

impl StoreSection {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.url {
            validate_database_url(url)?;
        }
        if self.max_connections == Some(0) {
            return Err(ConfigError::InvalidValue(
                "store.max_connections must be at least 1".into(),
            ));
        }
        if self.statement_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "store.statement_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// `[feature_info]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureInfoSection {
    /// WMS endpoint URL
    pub endpoint: Option<String>,

    /// Layer queried with GetFeatureInfo
    pub layer: Option<String>,

    /// Request timeout, in seconds
    pub timeout_secs: Option<u64>,
}

impl FeatureInfoSection {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "feature_info.endpoint '{}' must be an http(s) URL",
                    endpoint
                )));
            }
        }
        if let Some(layer) = &self.layer {
            if layer.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "feature_info.layer cannot be empty".into(),
                ));
            }
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "feature_info.timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Check that a connection URL targets PostgreSQL.
///
/// The URL itself is never echoed back since it may carry a password.
pub fn validate_database_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(
            "store.url must start with postgres:// or postgresql://".into(),
        ))
    }
}
