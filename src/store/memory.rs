//! store::memory
//!
//! In-memory geometry store for deterministic testing.
//!
//! # Design
//!
//! The memory store provides a deterministic implementation of the
//! `GeometryStore` trait. It keeps features in memory, evaluates
//! containment and centroids with the `geo` crate and distances with the
//! haversine formula, records every operation, and can be configured to
//! fail a chosen operation.
//!
//! # Example
//!
//! ```
//! use geoquery::store::memory::{MemoryStore, StoredRegion};
//! use geoquery::store::GeometryStore;
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new()
//!     .with_region(StoredRegion::rect(1, "Texas", "TX", (-106.6, 25.8), (-93.5, 36.5)))
//!     .with_point(1, "AT&T Stadium", "Arlington", "TX", 32.7473, -97.0945);
//!
//! assert_eq!(store.count_in_region("Texas").await.unwrap(), 1);
//! assert_eq!(store.count_in_region("Maine").await.unwrap(), 0);
//! # });
//! ```

use async_trait::async_trait;
use geo::{Centroid, Contains, MultiPolygon, Point, Polygon, Rect};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use super::sql::DEFAULT_STATUS;
use super::traits::{GeometryStore, NearestRow, RegionCount, SearchRow, StoreError};
use crate::core::types::{Coordinate, NewPoint, PointAttributes, SearchPattern};

/// Mean earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A stored point feature.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPoint {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub region: String,
    pub status: String,
    /// `x` is longitude, `y` latitude; `None` for a feature without geometry
    pub location: Option<Point<f64>>,
}

/// A stored region feature.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRegion {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub boundary: MultiPolygon<f64>,
}

impl StoredRegion {
    /// A region bounded by a polygon.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        code: impl Into<String>,
        boundary: Polygon<f64>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            code: code.into(),
            boundary: MultiPolygon::new(vec![boundary]),
        }
    }

    /// An axis-aligned region from `(lng, lat)` corners.
    pub fn rect(
        id: i64,
        name: impl Into<String>,
        code: impl Into<String>,
        min: (f64, f64),
        max: (f64, f64),
    ) -> Self {
        Self::new(id, name, code, Rect::new(min, max).to_polygon())
    }
}

/// Mock store for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MemoryStoreInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MemoryStoreInner {
    /// Point features in insertion order.
    points: Vec<StoredPoint>,
    /// Region features in insertion order.
    regions: Vec<StoredRegion>,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<StoreOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    CountInRegion(StoreError),
    CountPerRegion(StoreError),
    NearestPoint(StoreError),
    SearchPoints(StoreError),
    SearchRegions(StoreError),
    InsertPoint(StoreError),
    UpdatePoint(StoreError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOperation {
    CountInRegion { region_name: String },
    CountPerRegion,
    NearestPoint { lat: f64, lng: f64 },
    SearchPoints { pattern: String },
    SearchRegions { pattern: String },
    InsertPoint { name: String, lat: f64, lng: f64 },
    UpdatePoint { id: i64 },
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryStoreInner {
                points: Vec::new(),
                regions: Vec::new(),
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Add a region.
    pub fn with_region(self, region: StoredRegion) -> Self {
        self.inner.lock().unwrap().regions.push(region);
        self
    }

    /// Add an open point feature at `(lat, lng)`.
    pub fn with_point(
        self,
        id: i64,
        name: &str,
        city: &str,
        region: &str,
        lat: f64,
        lng: f64,
    ) -> Self {
        self.with_stored_point(StoredPoint {
            id,
            name: name.to_string(),
            city: city.to_string(),
            region: region.to_string(),
            status: DEFAULT_STATUS.to_string(),
            location: Some(Point::new(lng, lat)),
        })
    }

    /// Add a fully specified point feature.
    pub fn with_stored_point(self, point: StoredPoint) -> Self {
        self.inner.lock().unwrap().points.push(point);
        self
    }

    /// Configure the store to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<StoreOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Get a point by identifier (for test verification).
    pub fn point(&self, id: i64) -> Option<StoredPoint> {
        let inner = self.inner.lock().unwrap();
        inner.points.iter().find(|p| p.id == id).cloned()
    }

    /// Get the count of points.
    pub fn point_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.points.len()
    }

    /// Record an operation.
    fn record(&self, op: StoreOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Option<StoreError> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::CountInRegion(e)) if expected == "count_in_region" => Some(e.clone()),
            Some(FailOn::CountPerRegion(e)) if expected == "count_per_region" => Some(e.clone()),
            Some(FailOn::NearestPoint(e)) if expected == "nearest_point" => Some(e.clone()),
            Some(FailOn::SearchPoints(e)) if expected == "search_points" => Some(e.clone()),
            Some(FailOn::SearchRegions(e)) if expected == "search_regions" => Some(e.clone()),
            Some(FailOn::InsertPoint(e)) if expected == "insert_point" => Some(e.clone()),
            Some(FailOn::UpdatePoint(e)) if expected == "update_point" => Some(e.clone()),
            _ => None,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Great-circle distance in kilometres.
fn haversine_km(a: Point<f64>, b: Point<f64>) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let delta_lat = (b.y() - a.y()).to_radians();
    let delta_lon = (b.x() - a.x()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

fn contained_ids(region: &StoredRegion, points: &[StoredPoint]) -> Vec<i64> {
    points
        .iter()
        .filter(|p| {
            p.location
                .map(|loc| region.boundary.contains(&loc))
                .unwrap_or(false)
        })
        .map(|p| p.id)
        .collect()
}

#[async_trait]
impl GeometryStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn count_in_region(&self, region_name: &str) -> Result<i64, StoreError> {
        self.record(StoreOperation::CountInRegion {
            region_name: region_name.to_string(),
        });
        if let Some(err) = self.check_fail("count_in_region") {
            return Err(err);
        }

        let inner = self.inner.lock().unwrap();
        let ids: BTreeSet<i64> = inner
            .regions
            .iter()
            .filter(|r| r.name == region_name)
            .flat_map(|r| contained_ids(r, &inner.points))
            .collect();
        Ok(ids.len() as i64)
    }

    async fn count_per_region(&self) -> Result<Vec<RegionCount>, StoreError> {
        self.record(StoreOperation::CountPerRegion);
        if let Some(err) = self.check_fail("count_per_region") {
            return Err(err);
        }

        let inner = self.inner.lock().unwrap();
        let mut grouped: BTreeMap<&str, BTreeSet<i64>> = BTreeMap::new();
        for region in &inner.regions {
            grouped
                .entry(region.name.as_str())
                .or_default()
                .extend(contained_ids(region, &inner.points));
        }

        Ok(grouped
            .into_iter()
            .map(|(name, ids)| RegionCount {
                region_name: name.to_string(),
                count: ids.len() as i64,
            })
            .collect())
    }

    async fn nearest_point(&self, at: Coordinate) -> Result<Option<NearestRow>, StoreError> {
        self.record(StoreOperation::NearestPoint {
            lat: at.lat(),
            lng: at.lng(),
        });
        if let Some(err) = self.check_fail("nearest_point") {
            return Err(err);
        }

        let query = Point::new(at.lng(), at.lat());
        let inner = self.inner.lock().unwrap();
        let nearest = inner
            .points
            .iter()
            .filter_map(|p| p.location.map(|loc| (p, loc, haversine_km(query, loc))))
            .min_by(|(a, _, da), (b, _, db)| da.total_cmp(db).then(a.id.cmp(&b.id)));

        Ok(nearest.map(|(p, loc, distance_km)| NearestRow {
            name: p.name.clone(),
            city: p.city.clone(),
            region: p.region.clone(),
            lat: Some(loc.y()),
            lng: Some(loc.x()),
            distance_km,
        }))
    }

    async fn search_points(&self, pattern: &SearchPattern) -> Result<Vec<SearchRow>, StoreError> {
        self.record(StoreOperation::SearchPoints {
            pattern: pattern.as_like().to_string(),
        });
        if let Some(err) = self.check_fail("search_points") {
            return Err(err);
        }

        let inner = self.inner.lock().unwrap();
        Ok(inner
            .points
            .iter()
            .filter(|p| {
                pattern.matches(&p.name) || pattern.matches(&p.city) || pattern.matches(&p.region)
            })
            .map(|p| SearchRow {
                name: p.name.clone(),
                city_or_code: p.city.clone(),
                region: Some(p.region.clone()),
                lat: p.location.map(|loc| loc.y()),
                lng: p.location.map(|loc| loc.x()),
            })
            .collect())
    }

    async fn search_regions(&self, pattern: &SearchPattern) -> Result<Vec<SearchRow>, StoreError> {
        self.record(StoreOperation::SearchRegions {
            pattern: pattern.as_like().to_string(),
        });
        if let Some(err) = self.check_fail("search_regions") {
            return Err(err);
        }

        let inner = self.inner.lock().unwrap();
        Ok(inner
            .regions
            .iter()
            .filter(|r| pattern.matches(&r.name) || pattern.matches(&r.code))
            .map(|r| {
                let centroid = r.boundary.centroid();
                SearchRow {
                    name: r.name.clone(),
                    city_or_code: r.code.clone(),
                    region: None,
                    lat: centroid.map(|c| c.y()),
                    lng: centroid.map(|c| c.x()),
                }
            })
            .collect())
    }

    async fn insert_point(&self, point: &NewPoint) -> Result<i64, StoreError> {
        self.record(StoreOperation::InsertPoint {
            name: point.name.clone(),
            lat: point.location.lat(),
            lng: point.location.lng(),
        });
        if let Some(err) = self.check_fail("insert_point") {
            return Err(err);
        }

        // Read-max and insert happen under one lock.
        let mut inner = self.inner.lock().unwrap();
        let id = inner.points.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        inner.points.push(StoredPoint {
            id,
            name: point.name.clone(),
            city: point.city.clone(),
            region: point.region.clone(),
            status: DEFAULT_STATUS.to_string(),
            location: Some(Point::new(point.location.lng(), point.location.lat())),
        });
        Ok(id)
    }

    async fn update_point(&self, id: i64, attrs: &PointAttributes) -> Result<u64, StoreError> {
        self.record(StoreOperation::UpdatePoint { id });
        if let Some(err) = self.check_fail("update_point") {
            return Err(err);
        }

        let mut inner = self.inner.lock().unwrap();
        let mut affected = 0;
        for p in inner.points.iter_mut().filter(|p| p.id == id) {
            p.name = attrs.name.clone();
            p.city = attrs.city.clone();
            p.region = attrs.region.clone();
            affected += 1;
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texas() -> StoredRegion {
        StoredRegion::rect(1, "Texas", "TX", (-106.6, 25.8), (-93.5, 36.5))
    }

    #[test]
    fn haversine_known_distance() {
        // Dallas to Houston is roughly 362 km.
        let dallas = Point::new(-96.7970, 32.7767);
        let houston = Point::new(-95.3698, 29.7604);
        let d = haversine_km(dallas, houston);
        assert!((d - 362.0).abs() < 5.0, "got {}", d);
        assert_eq!(haversine_km(dallas, dallas), 0.0);
    }

    #[tokio::test]
    async fn nearest_breaks_ties_by_lowest_id() {
        let store = MemoryStore::new()
            .with_point(7, "B", "c", "TX", 30.0, -97.0)
            .with_point(3, "A", "c", "TX", 30.0, -97.0);

        let at = Coordinate::new(31.0, -97.0).unwrap();
        let row = store.nearest_point(at).await.unwrap().unwrap();
        assert_eq!(row.name, "A");
    }

    #[tokio::test]
    async fn points_without_geometry_are_skipped() {
        let store = MemoryStore::new().with_stored_point(StoredPoint {
            id: 1,
            name: "Nowhere".into(),
            city: "x".into(),
            region: "TX".into(),
            status: DEFAULT_STATUS.into(),
            location: None,
        });

        let at = Coordinate::new(0.0, 0.0).unwrap();
        assert!(store.nearest_point(at).await.unwrap().is_none());
        assert_eq!(store.count_in_region("Texas").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn region_centroid_reported() {
        let store = MemoryStore::new().with_region(StoredRegion::rect(
            1,
            "Square",
            "SQ",
            (0.0, 0.0),
            (2.0, 4.0),
        ));
        let pattern = SearchPattern::contains("sq").unwrap();
        let rows = store.search_regions(&pattern).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].lat.unwrap() - 2.0).abs() < 1e-9);
        assert!((rows[0].lng.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(rows[0].region, None);
    }

    #[tokio::test]
    async fn insert_assigns_max_plus_one() {
        let store = MemoryStore::new()
            .with_region(texas())
            .with_point(41, "Old", "Austin", "TX", 30.28, -97.73);

        let new = NewPoint {
            name: "New".into(),
            city: "Austin".into(),
            region: "TX".into(),
            location: Coordinate::new(30.3, -97.7).unwrap(),
        };
        assert_eq!(store.insert_point(&new).await.unwrap(), 42);
        assert_eq!(store.point(42).unwrap().status, "Open");
        assert_eq!(store.count_in_region("Texas").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn fail_on_returns_configured_error() {
        let store =
            MemoryStore::new().fail_on(FailOn::CountPerRegion(StoreError::Query("boom".into())));

        assert_eq!(
            store.count_per_region().await,
            Err(StoreError::Query("boom".into()))
        );
        assert_eq!(store.operations(), vec![StoreOperation::CountPerRegion]);

        store.clear_fail_on();
        assert!(store.count_per_region().await.unwrap().is_empty());
    }
}
