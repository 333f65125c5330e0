//! service::query
//!
//! Read-only spatial queries: containment counts, nearest point and
//! attribute search.
//!
//! # Design
//!
//! Each operation validates its input, then issues store operations
//! strictly in sequence. All geometry work (containment, distance,
//! centroid) is done by the store; this module only shapes results.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use geoquery::service::SpatialQueryService;
//! use geoquery::store::memory::{MemoryStore, StoredRegion};
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new()
//!     .with_region(StoredRegion::rect(1, "Texas", "TX", (-106.6, 25.8), (-93.5, 36.5)))
//!     .with_point(1, "AT&T Stadium", "Arlington", "TX", 32.7473, -97.0945);
//!
//! let service = SpatialQueryService::new(Arc::new(store));
//! let texas = service.count_in_region(Some("Texas")).await.unwrap();
//! assert_eq!(texas.count, 1);
//! # });
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::ServiceError;
use super::parse_coordinate;
use crate::core::types::{Coordinate, CoordinateInput, FeatureKind, SearchPattern};
use crate::store::{GeometryStore, RegionCount, SearchRow};

/// Raw nearest-point request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NearestQuery {
    pub lat: Option<CoordinateInput>,
    pub lng: Option<CoordinateInput>,
}

/// The feature returned by a nearest-point search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestFeature {
    pub name: String,
    pub city: String,
    pub region: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Nearest-point search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestResult {
    /// The validated query coordinate
    pub query_point: Coordinate,
    pub feature: NearestFeature,
    /// Geodesic distance in kilometres
    pub distance_km: f64,
}

/// One attribute-search hit, point or region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub city_or_code: String,
    pub region: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(rename = "type")]
    pub kind: FeatureKind,
}

impl SearchHit {
    fn from_row(row: SearchRow, kind: FeatureKind) -> Self {
        Self {
            name: row.name,
            city_or_code: row.city_or_code,
            region: row.region,
            lat: row.lat,
            lng: row.lng,
            kind,
        }
    }
}

/// Read-only spatial queries over a geometry store.
#[derive(Clone)]
pub struct SpatialQueryService {
    store: Arc<dyn GeometryStore>,
}

impl std::fmt::Debug for SpatialQueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialQueryService")
            .field("store", &self.store.name())
            .finish()
    }
}

impl SpatialQueryService {
    /// Create a service over `store`.
    pub fn new(store: Arc<dyn GeometryStore>) -> Self {
        Self { store }
    }

    /// Count point features inside the named region.
    ///
    /// The name is passed to the store exactly as given; an unknown region
    /// counts 0.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` on field `region_name` if the name is
    ///   absent or blank (the store is not called)
    /// - `ServiceError::Store` if the store fails
    #[tracing::instrument(skip(self))]
    pub async fn count_in_region(
        &self,
        region_name: Option<&str>,
    ) -> Result<RegionCount, ServiceError> {
        let region_name = match region_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(ServiceError::missing("region_name")),
        };

        let count = self.store.count_in_region(region_name).await?;
        tracing::debug!(count, "region count");
        Ok(RegionCount {
            region_name: region_name.to_string(),
            count,
        })
    }

    /// Count point features for every region, zero counts included.
    ///
    /// Region names are keys exactly as stored.
    #[tracing::instrument(skip(self))]
    pub async fn all_counts(&self) -> Result<BTreeMap<String, i64>, ServiceError> {
        let rows = self.store.count_per_region().await?;
        tracing::debug!(regions = rows.len(), "per-region counts");
        Ok(rows
            .into_iter()
            .map(|row| (row.region_name, row.count))
            .collect())
    }

    /// Find the point feature nearest to a coordinate.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` if `lat` or `lng` is absent, not a
    ///   finite number, or out of range (the store is not called)
    /// - `ServiceError::NotFound` if the store holds no located point
    /// - `ServiceError::Store` if the store fails
    #[tracing::instrument(skip(self))]
    pub async fn nearest(&self, query: &NearestQuery) -> Result<NearestResult, ServiceError> {
        let at = parse_coordinate(query.lat.as_ref(), query.lng.as_ref())?;

        let row = self
            .store
            .nearest_point(at)
            .await?
            .ok_or_else(|| ServiceError::NotFound("stadium".to_string()))?;

        tracing::debug!(distance_km = row.distance_km, "nearest point found");
        Ok(NearestResult {
            query_point: at,
            feature: NearestFeature {
                name: row.name,
                city: row.city,
                region: row.region,
                lat: row.lat,
                lng: row.lng,
            },
            distance_km: row.distance_km,
        })
    }

    /// Case-insensitive substring search over stadiums, then states.
    ///
    /// Blank input returns an empty list without touching the store.
    /// Stadium hits come first, then state hits, each in store order.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ServiceError> {
        let Some(pattern) = SearchPattern::contains(query) else {
            return Ok(Vec::new());
        };

        let points = self.store.search_points(&pattern).await?;
        let regions = self.store.search_regions(&pattern).await?;
        tracing::debug!(
            stadiums = points.len(),
            states = regions.len(),
            "search finished"
        );

        Ok(points
            .into_iter()
            .map(|row| SearchHit::from_row(row, FeatureKind::Stadium))
            .chain(
                regions
                    .into_iter()
                    .map(|row| SearchHit::from_row(row, FeatureKind::State)),
            )
            .collect())
    }
}
