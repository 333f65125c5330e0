//! upstream::feature_info
//!
//! WMS `GetFeatureInfo` proxy for the map service.
//!
//! # Design
//!
//! The proxy forwards a pixel/bbox identify request to a fixed WMS endpoint
//! with a fixed layer and reference system, asking for the single feature
//! under the pixel as JSON. The upstream body is relayed verbatim.
//!
//! - Inputs are validated before any request is sent
//! - Transport failures, timeouts, non-2xx statuses and non-JSON bodies all
//!   become [`GatewayError`]
//! - No retry, no cache
//!
//! # Example
//!
//! ```ignore
//! use geoquery::upstream::{FeatureInfoProxy, FeatureInfoRequest, FeatureInfoSettings};
//!
//! let proxy = FeatureInfoProxy::new(FeatureInfoSettings::default())?;
//! let body = proxy.identify(&FeatureInfoRequest {
//!     bbox: Some("-125,24,-66,50".into()),
//!     width: Some("800".into()),
//!     height: Some("600".into()),
//!     x: Some("412".into()),
//!     y: Some("300".into()),
//! }).await?;
//! ```

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::config::{Config, DEFAULT_FEATURE_INFO_ENDPOINT, DEFAULT_FEATURE_INFO_LAYER};
use crate::service::errors::ServiceError;
use crate::store::redact_credentials;

/// Reference system sent with every request.
pub const FEATURE_INFO_SRS: &str = "EPSG:4326";

/// Errors from the upstream feature-info service.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// The service could not be reached.
    #[error("could not connect to the feature-info service: {0}")]
    Unreachable(String),

    /// The request exceeded the configured timeout.
    #[error("feature-info request timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a non-success status.
    #[error("feature-info service returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The body was not valid JSON.
    #[error("feature-info service returned an unreadable body: {0}")]
    Body(String),
}

/// Identify request parameters, as received from the map client.
///
/// Upper-case WMS spellings (`BBOX`, `WIDTH`, ...) are accepted too.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeatureInfoRequest {
    #[serde(alias = "BBOX")]
    pub bbox: Option<String>,
    #[serde(alias = "WIDTH")]
    pub width: Option<String>,
    #[serde(alias = "HEIGHT")]
    pub height: Option<String>,
    #[serde(alias = "X")]
    pub x: Option<String>,
    #[serde(alias = "Y")]
    pub y: Option<String>,
}

/// Validated identify parameters.
#[derive(Debug, Clone, PartialEq)]
struct Identify {
    bbox: String,
    width: u32,
    height: u32,
    x: u32,
    y: u32,
}

impl FeatureInfoRequest {
    fn validate(&self) -> Result<Identify, ServiceError> {
        let bbox = required("bbox", self.bbox.as_deref())?;
        let corners: Vec<&str> = bbox.split(',').map(str::trim).collect();
        let valid_bbox = corners.len() == 4
            && corners
                .iter()
                .all(|c| c.parse::<f64>().map(f64::is_finite).unwrap_or(false));
        if !valid_bbox {
            return Err(ServiceError::invalid(
                "bbox",
                "expected four comma-separated numbers: minx,miny,maxx,maxy",
            ));
        }

        let width = pixels("width", self.width.as_deref())?;
        let height = pixels("height", self.height.as_deref())?;
        if width == 0 || height == 0 {
            return Err(ServiceError::invalid(
                if width == 0 { "width" } else { "height" },
                "must be positive",
            ));
        }

        Ok(Identify {
            bbox: corners.join(","),
            width,
            height,
            x: pixels("x", self.x.as_deref())?,
            y: pixels("y", self.y.as_deref())?,
        })
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ServiceError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServiceError::missing(field)),
    }
}

fn pixels(field: &'static str, value: Option<&str>) -> Result<u32, ServiceError> {
    required(field, value)?
        .parse::<u32>()
        .map_err(|_| ServiceError::invalid(field, "must be a non-negative integer pixel value"))
}

/// Where and how to reach the WMS service.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfoSettings {
    /// WMS endpoint URL
    pub endpoint: String,
    /// Layer queried (also used as `QUERY_LAYERS`)
    pub layer: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl Default for FeatureInfoSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_FEATURE_INFO_ENDPOINT.to_string(),
            layer: DEFAULT_FEATURE_INFO_LAYER.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl From<&Config> for FeatureInfoSettings {
    fn from(config: &Config) -> Self {
        Self {
            endpoint: config.feature_info_endpoint().to_string(),
            layer: config.feature_info_layer().to_string(),
            timeout: config.feature_info_timeout(),
        }
    }
}

/// Proxy for WMS `GetFeatureInfo`.
#[derive(Debug, Clone)]
pub struct FeatureInfoProxy {
    /// HTTP client for making requests
    client: Client,
    settings: FeatureInfoSettings,
}

impl FeatureInfoProxy {
    /// Create a proxy with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Unreachable` if the HTTP client cannot be built.
    pub fn new(settings: FeatureInfoSettings) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GatewayError::Unreachable(e.to_string()))?;
        Ok(Self { client, settings })
    }

    /// Query parameters for one identify request.
    fn query_params(&self, identify: &Identify) -> Vec<(&'static str, String)> {
        vec![
            ("SERVICE", "WMS".to_string()),
            ("VERSION", "1.1.1".to_string()),
            ("REQUEST", "GetFeatureInfo".to_string()),
            ("LAYERS", self.settings.layer.clone()),
            ("QUERY_LAYERS", self.settings.layer.clone()),
            ("INFO_FORMAT", "application/json".to_string()),
            ("FEATURE_COUNT", "1".to_string()),
            ("X", identify.x.to_string()),
            ("Y", identify.y.to_string()),
            ("SRS", FEATURE_INFO_SRS.to_string()),
            ("WIDTH", identify.width.to_string()),
            ("HEIGHT", identify.height.to_string()),
            ("BBOX", identify.bbox.clone()),
        ]
    }

    /// Forward an identify request and relay the upstream JSON.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` if a parameter is missing or malformed
    ///   (nothing is sent)
    /// - `ServiceError::Gateway` for any upstream failure
    #[tracing::instrument(skip(self))]
    pub async fn identify(&self, request: &FeatureInfoRequest) -> Result<Value, ServiceError> {
        let identify = request.validate()?;
        let params = self.query_params(&identify);

        let response = self
            .client
            .get(&self.settings.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "feature-info service returned an error");
            return Err(GatewayError::Status {
                status: status.as_u16(),
            }
            .into());
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::Body(redact_credentials(&e.to_string())))?;

        tracing::debug!("feature-info response relayed");
        Ok(body)
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            tracing::warn!(timeout = ?self.settings.timeout, "feature-info request timed out");
            GatewayError::Timeout(self.settings.timeout)
        } else {
            let message = redact_credentials(&err.to_string());
            tracing::warn!(error = %message, "feature-info service unreachable");
            GatewayError::Unreachable(message)
        }
    }
}
