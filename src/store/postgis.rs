//! store::postgis
//!
//! PostgreSQL + PostGIS implementation of [`GeometryStore`].
//!
//! # Design
//!
//! - Statements come from [`super::sql`]; user values are always bound.
//! - Reads run directly on the pool. Mutations run in an explicit
//!   transaction that is committed before returning; dropping the
//!   transaction on any error path rolls it back.
//! - Pooled connections are RAII guards, so every exit path returns them.
//! - Every call is bounded by the configured statement timeout.
//! - Driver errors are mapped to [`StoreError`] with credentials redacted.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use geoquery::store::{GeometryStore, PostgisStore};
//!
//! # tokio_test::block_on(async {
//! let store = PostgisStore::connect_lazy(
//!     "postgres://gis@localhost/football",
//!     5,
//!     Duration::from_secs(10),
//! ).unwrap();
//!
//! let count = store.count_in_region("Texas").await.unwrap();
//! println!("{} stadiums in Texas", count);
//! # });
//! ```

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::sql;
use super::traits::{
    redact_credentials, GeometryStore, NearestRow, RegionCount, SearchRow, StoreError,
};
use crate::core::types::{Coordinate, NewPoint, PointAttributes, SearchPattern};

/// PostGIS-backed geometry store.
pub struct PostgisStore {
    /// Connection pool
    pool: PgPool,
    /// Upper bound for one store call (including pool acquisition)
    statement_timeout: Duration,
}

// Custom Debug to avoid exposing the connection URL
impl std::fmt::Debug for PostgisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgisStore")
            .field("pool_size", &self.pool.size())
            .field("statement_timeout", &self.statement_timeout)
            .finish()
    }
}

impl PostgisStore {
    /// Create a store whose pool connects on first use.
    ///
    /// Only the URL is parsed here; no connection is opened until the
    /// first operation.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the URL cannot be parsed.
    pub fn connect_lazy(
        url: &str,
        max_connections: u32,
        statement_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(statement_timeout)
            .connect_lazy(url)
            .map_err(map_sqlx_error)?;

        Ok(Self::from_pool(pool, statement_timeout))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }

    /// Run one store call under the statement timeout.
    async fn bounded<T, F>(&self, statement: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        tracing::debug!(statement, "executing store call");

        match tokio::time::timeout(self.statement_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let err = map_sqlx_error(e);
                tracing::warn!(statement, error = %err, "store call failed");
                Err(err)
            }
            Err(_) => {
                tracing::warn!(statement, timeout = ?self.statement_timeout, "store call timed out");
                Err(StoreError::Timeout(self.statement_timeout))
            }
        }
    }
}

/// Map a driver error to a [`StoreError`], redacting credentials.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    let message = redact_credentials(&err.to_string());
    match err {
        sqlx::Error::Configuration(_)
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Connection(message),
        sqlx::Error::PoolTimedOut => StoreError::Connection(message),
        sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::TypeNotFound { .. } => StoreError::Decode(message),
        _ => StoreError::Query(message),
    }
}

#[async_trait]
impl GeometryStore for PostgisStore {
    fn name(&self) -> &'static str {
        "postgis"
    }

    async fn count_in_region(&self, region_name: &str) -> Result<i64, StoreError> {
        self.bounded(
            "count_in_region",
            sqlx::query_scalar::<_, i64>(sql::COUNT_IN_REGION)
                .bind(region_name)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn count_per_region(&self) -> Result<Vec<RegionCount>, StoreError> {
        self.bounded(
            "count_per_region",
            sqlx::query_as::<_, RegionCount>(sql::COUNT_PER_REGION).fetch_all(&self.pool),
        )
        .await
    }

    async fn nearest_point(&self, at: Coordinate) -> Result<Option<NearestRow>, StoreError> {
        self.bounded(
            "nearest_point",
            sqlx::query_as::<_, NearestRow>(sql::NEAREST_POINT)
                .bind(at.lng())
                .bind(at.lat())
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn search_points(&self, pattern: &SearchPattern) -> Result<Vec<SearchRow>, StoreError> {
        self.bounded(
            "search_points",
            sqlx::query_as::<_, SearchRow>(sql::SEARCH_POINTS)
                .bind(pattern.as_like())
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn search_regions(&self, pattern: &SearchPattern) -> Result<Vec<SearchRow>, StoreError> {
        self.bounded(
            "search_regions",
            sqlx::query_as::<_, SearchRow>(sql::SEARCH_REGIONS)
                .bind(pattern.as_like())
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn insert_point(&self, point: &NewPoint) -> Result<i64, StoreError> {
        let pool = &self.pool;
        self.bounded("insert_point", async move {
            let mut tx = pool.begin().await?;
            sqlx::query(sql::SERIALIZABLE).execute(&mut *tx).await?;

            let id: i64 = sqlx::query_scalar(sql::NEXT_POINT_ID)
                .fetch_one(&mut *tx)
                .await?;

            sqlx::query(sql::INSERT_POINT)
                .bind(id)
                .bind(&point.name)
                .bind(&point.city)
                .bind(&point.region)
                .bind(sql::DEFAULT_STATUS)
                .bind(point.location.lng())
                .bind(point.location.lat())
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok::<_, sqlx::Error>(id)
        })
        .await
    }

    async fn update_point(&self, id: i64, attrs: &PointAttributes) -> Result<u64, StoreError> {
        let pool = &self.pool;
        self.bounded("update_point", async move {
            let mut tx = pool.begin().await?;

            let result = sqlx::query(sql::UPDATE_POINT)
                .bind(&attrs.name)
                .bind(&attrs.city)
                .bind(&attrs.region)
                .bind(id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok::<_, sqlx::Error>(result.rows_affected())
        })
        .await
    }
}
