//! core
//!
//! Core domain types and configuration for geoquery.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Coordinate, SearchPattern, NewPoint, etc.
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Inputs are validated once, before any store round trip

pub mod config;
pub mod types;
