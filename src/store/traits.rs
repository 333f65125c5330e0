//! store::traits
//!
//! Geometry store trait definition and typed result rows.
//!
//! # Design
//!
//! The `GeometryStore` trait is async because every operation is a round
//! trip to the spatial database. Each method runs one parameterized
//! statement (or one transaction for mutations) and decodes the result into
//! a typed row at this boundary, so services never see column-keyed records.
//!
//! Geometric predicates (containment, nearest neighbour, centroid) are
//! evaluated by the store, never by the caller.
//!
//! # Example
//!
//! ```ignore
//! use geoquery::store::{GeometryStore, StoreError};
//!
//! async fn texas(store: &dyn GeometryStore) -> Result<i64, StoreError> {
//!     store.count_in_region("Texas").await
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::core::types::{Coordinate, NewPoint, PointAttributes, SearchPattern};

/// Errors from store operations.
///
/// Messages carry the underlying driver message with connection
/// credentials redacted (see [`redact_credentials`]).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The store could not be reached or the connection broke.
    #[error("store connection failed: {0}")]
    Connection(String),

    /// The statement was rejected or failed while executing.
    #[error("store query failed: {0}")]
    Query(String),

    /// A returned row did not match the expected shape.
    #[error("failed to decode store row: {0}")]
    Decode(String),

    /// The call exceeded the configured statement timeout.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

/// Stadium count for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct RegionCount {
    pub region_name: String,
    pub count: i64,
}

/// The nearest point feature to a query coordinate.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct NearestRow {
    pub name: String,
    pub city: String,
    pub region: String,
    /// Stored latitude, `None` when the feature has no geometry
    pub lat: Option<f64>,
    /// Stored longitude, `None` when the feature has no geometry
    pub lng: Option<f64>,
    pub distance_km: f64,
}

/// One attribute-search hit.
///
/// For stadiums `city_or_code` is the city and `region` the state code;
/// for states `city_or_code` is the short code and `region` is `None`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SearchRow {
    pub name: String,
    pub city_or_code: String,
    pub region: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// The spatial store seen by the query and mutation services.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a single handle can be shared
/// by concurrent requests.
///
/// # Error Handling
///
/// All methods return `Result<T, StoreError>` and never retry.
#[async_trait]
pub trait GeometryStore: Send + Sync {
    /// Get the store name (e.g., "postgis", "memory").
    fn name(&self) -> &'static str;

    /// Count distinct point features contained in the named region.
    ///
    /// An unknown region counts 0.
    async fn count_in_region(&self, region_name: &str) -> Result<i64, StoreError>;

    /// Count contained point features for every region, zero counts included.
    ///
    /// Rows are ordered by region name.
    async fn count_per_region(&self) -> Result<Vec<RegionCount>, StoreError>;

    /// Find the single nearest point feature and its geodesic distance in km.
    ///
    /// Ties are broken by the lowest identifier. Returns `None` when the
    /// store holds no point with a geometry.
    async fn nearest_point(&self, at: Coordinate) -> Result<Option<NearestRow>, StoreError>;

    /// Point features whose name, city or region matches the pattern.
    async fn search_points(&self, pattern: &SearchPattern) -> Result<Vec<SearchRow>, StoreError>;

    /// Region features whose name or short code matches the pattern,
    /// reported at their centroid.
    async fn search_regions(&self, pattern: &SearchPattern) -> Result<Vec<SearchRow>, StoreError>;

    /// Insert a point feature and commit.
    ///
    /// The identifier is assigned atomically as the current maximum plus one.
    ///
    /// # Returns
    ///
    /// The assigned identifier.
    async fn insert_point(&self, point: &NewPoint) -> Result<i64, StoreError>;

    /// Update name, city and region of a point feature and commit.
    ///
    /// # Returns
    ///
    /// The number of rows affected (0 when the identifier does not exist).
    async fn update_point(&self, id: i64, attrs: &PointAttributes) -> Result<u64, StoreError>;
}

/// Strip `user:password@` credentials from any URL embedded in a message.
///
/// # Example
///
/// ```
/// use geoquery::store::redact_credentials;
///
/// let msg = "error connecting to postgres://gis:s3cret@db:5432/football";
/// assert_eq!(
///     redact_credentials(msg),
///     "error connecting to postgres://***@db:5432/football"
/// );
/// ```
pub fn redact_credentials(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut rest = message;

    while let Some(pos) = rest.find("://") {
        let (head, tail) = rest.split_at(pos + 3);
        out.push_str(head);

        // Userinfo ends at the last '@' before the host's path, query or
        // fragment; raw passwords may contain '/' or '@'.
        let token = &tail[..tail.find(char::is_whitespace).unwrap_or(tail.len())];
        let host_start = token.find('@').map(|first| {
            let after = &token[first + 1..];
            let host_end = after
                .find(|c: char| c == '/' || c == '?' || c == '#')
                .unwrap_or(after.len());
            first + 1 + after[..host_end].rfind('@').map_or(0, |at| at + 1)
        });

        match host_start {
            Some(start) => {
                out.push_str("***@");
                rest = &tail[start..];
            }
            None => rest = tail,
        }
    }

    out.push_str(rest);
    out
}
