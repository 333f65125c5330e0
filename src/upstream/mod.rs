//! upstream
//!
//! Clients for services this crate forwards to but does not own.
//!
//! # Modules
//!
//! - [`feature_info`]: WMS `GetFeatureInfo` proxy for the map service

pub mod feature_info;

pub use feature_info::{
    FeatureInfoProxy, FeatureInfoRequest, FeatureInfoSettings, GatewayError, FEATURE_INFO_SRS,
};
