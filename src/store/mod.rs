//! store
//!
//! Abstraction over the spatial store holding stadiums and states.
//!
//! # Architecture
//!
//! The `GeometryStore` trait defines the typed operations the services
//! need. Services receive a store handle explicitly (usually an
//! `Arc<dyn GeometryStore>`), never a global connection.
//!
//! - Statements are parameterized; only compile-time constants are spliced
//! - Mutations commit in an explicit transaction
//! - Failures surface as [`StoreError`] and are never retried
//!
//! # Modules
//!
//! - `traits`: Core `GeometryStore` trait, row types and `StoreError`
//! - [`sql`]: PostGIS statements
//! - [`postgis`]: PostgreSQL + PostGIS implementation using sqlx
//! - [`memory`]: In-memory implementation for deterministic testing

pub mod memory;
pub mod postgis;
pub mod sql;
mod traits;

pub use postgis::PostgisStore;
pub use traits::*;
