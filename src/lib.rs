//! geoquery - spatial lookups over stadium and state features
//!
//! geoquery answers a small set of geospatial questions about point
//! features (stadiums) and polygon features (states) held in PostGIS:
//! how many stadiums lie inside a state, which stadium is nearest to a
//! coordinate, which stadiums and states match a free-text search. It also
//! creates and updates stadiums, and relays pixel identify requests to a
//! WMS map service.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to services)
//! - [`service`] - Request validation, query and mutation operations, error taxonomy
//! - [`store`] - `GeometryStore` trait with PostGIS and in-memory implementations
//! - [`upstream`] - WMS `GetFeatureInfo` proxy
//! - [`core`] - Domain types and configuration
//! - [`ui`] - JSON output and logging
//!
//! # Invariants
//!
//! 1. User values reach the store only as bound parameters
//! 2. Rejected requests never reach the store
//! 3. Every mutation commits in its own transaction or not at all
//! 4. Geometry predicates are evaluated by the store, never by the services

pub mod cli;
pub mod core;
pub mod service;
pub mod store;
pub mod ui;
pub mod upstream;
