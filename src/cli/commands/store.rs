//! Store resolution for command handlers.
//!
//! The store URL is only required once a request actually reaches the
//! store. Until then a [`Deferred`] handle stands in, so validation errors
//! and empty searches are answered without any configuration.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::{Config, ConfigError};
use crate::core::types::{Coordinate, NewPoint, PointAttributes, SearchPattern};
use crate::service::ServiceError;
use crate::store::{
    GeometryStore, NearestRow, PostgisStore, RegionCount, SearchRow, StoreError,
};

/// The store handle passed to a service call.
pub(crate) enum Resolved {
    /// A lazily connected PostGIS pool.
    Postgis(Arc<dyn GeometryStore>),
    /// No URL is configured; every store call fails.
    Deferred(ConfigError),
}

impl Resolved {
    /// Resolve the store from configuration.
    ///
    /// Must run inside a tokio runtime, but performs no I/O.
    pub(crate) fn from_config(config: &Config) -> Result<Self, ServiceError> {
        match config.database_url() {
            Ok(url) => {
                let store = PostgisStore::connect_lazy(
                    url,
                    config.max_connections(),
                    config.statement_timeout(),
                )?;
                Ok(Resolved::Postgis(Arc::new(store)))
            }
            Err(err) => Ok(Resolved::Deferred(err)),
        }
    }

    pub(crate) fn handle(&self) -> Arc<dyn GeometryStore> {
        match self {
            Resolved::Postgis(store) => Arc::clone(store),
            Resolved::Deferred(err) => Arc::new(Deferred(err.to_string())),
        }
    }

    /// The configuration error to report if the call reached the store.
    pub(crate) fn config_error(&self) -> Option<&ConfigError> {
        match self {
            Resolved::Postgis(_) => None,
            Resolved::Deferred(err) => Some(err),
        }
    }
}

/// Stand-in for a store that has no URL.
struct Deferred(String);

impl Deferred {
    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Connection(self.0.clone()))
    }
}

#[async_trait]
impl GeometryStore for Deferred {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn count_in_region(&self, _region_name: &str) -> Result<i64, StoreError> {
        self.fail()
    }

    async fn count_per_region(&self) -> Result<Vec<RegionCount>, StoreError> {
        self.fail()
    }

    async fn nearest_point(&self, _at: Coordinate) -> Result<Option<NearestRow>, StoreError> {
        self.fail()
    }

    async fn search_points(&self, _pattern: &SearchPattern) -> Result<Vec<SearchRow>, StoreError> {
        self.fail()
    }

    async fn search_regions(
        &self,
        _pattern: &SearchPattern,
    ) -> Result<Vec<SearchRow>, StoreError> {
        self.fail()
    }

    async fn insert_point(&self, _point: &NewPoint) -> Result<i64, StoreError> {
        self.fail()
    }

    async fn update_point(&self, _id: i64, _attrs: &PointAttributes) -> Result<u64, StoreError> {
        self.fail()
    }
}
