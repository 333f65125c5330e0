//! service
//!
//! Request-level operations over the geometry store.
//!
//! # Architecture
//!
//! Services receive already-parsed request values, validate them, run one
//! or more store operations in sequence and return typed results. They
//! hold an explicit `Arc<dyn GeometryStore>` and no other state.
//!
//! Validation always completes before the first store call, so a
//! rejected request never reaches the store.
//!
//! # Modules
//!
//! - [`errors`]: `ServiceError` and the boundary `ErrorResponse`
//! - [`query`]: containment counts, nearest point, attribute search
//! - [`mutation`]: create and update of point features

pub mod errors;
pub mod mutation;
pub mod query;

pub use errors::{ErrorResponse, ServiceError};
pub use mutation::{CreatePointRequest, MutationAck, MutationService, UpdatePointRequest};
pub use query::{NearestFeature, NearestQuery, NearestResult, SearchHit, SpatialQueryService};

use crate::core::types::{Coordinate, CoordinateInput};

/// Require a non-blank text field, returning it trimmed.
pub(crate) fn required_text<'a>(
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, ServiceError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServiceError::missing(field)),
    }
}

/// Check that a coordinate component is present, without parsing it.
pub(crate) fn require_present(
    field: &'static str,
    value: Option<&CoordinateInput>,
) -> Result<(), ServiceError> {
    match value {
        None => Err(ServiceError::missing(field)),
        Some(CoordinateInput::Text(s)) if s.trim().is_empty() => {
            Err(ServiceError::missing(field))
        }
        Some(_) => Ok(()),
    }
}

/// Parse and range-check a `lat`/`lng` pair.
///
/// Absent or blank components fail with "missing required field"; anything
/// present but unusable fails with a distinct invalid-coordinate message
/// naming the offending field.
pub(crate) fn parse_coordinate(
    lat: Option<&CoordinateInput>,
    lng: Option<&CoordinateInput>,
) -> Result<Coordinate, ServiceError> {
    require_present("lat", lat)?;
    require_present("lng", lng)?;

    let lat = component("lat", lat, Coordinate::check_lat)?;
    let lng = component("lng", lng, Coordinate::check_lng)?;
    Coordinate::new(lat, lng).map_err(|e| ServiceError::from_type_error("lat", e))
}

fn component(
    field: &'static str,
    value: Option<&CoordinateInput>,
    check: fn(f64) -> Result<f64, crate::core::types::TypeError>,
) -> Result<f64, ServiceError> {
    let input = value.ok_or_else(|| ServiceError::missing(field))?;
    input
        .parse()
        .and_then(check)
        .map_err(|e| ServiceError::from_type_error(field, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ServiceError) -> String {
        match err {
            ServiceError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn required_text_trims() {
        assert_eq!(required_text("name", Some("  Rice  ")), Ok("Rice"));
        assert_eq!(
            required_text("name", Some("   ")),
            Err(ServiceError::missing("name"))
        );
        assert_eq!(
            required_text("name", None),
            Err(ServiceError::missing("name"))
        );
    }

    #[test]
    fn coordinate_from_mixed_inputs() {
        let lat = CoordinateInput::from("29.7");
        let lng = CoordinateInput::from(-95.4);
        let c = parse_coordinate(Some(&lat), Some(&lng)).unwrap();
        assert_eq!((c.lat(), c.lng()), (29.7, -95.4));
    }

    #[test]
    fn missing_checked_before_invalid() {
        let bad = CoordinateInput::from("north");
        let err = parse_coordinate(Some(&bad), None).unwrap_err();
        assert_eq!(err, ServiceError::missing("lng"));
    }

    #[test]
    fn out_of_range_names_field() {
        let lat = CoordinateInput::from(10.0);
        let lng = CoordinateInput::from(200.0);
        let err = parse_coordinate(Some(&lat), Some(&lng)).unwrap_err();
        assert_eq!(field_of(err), "lng");
    }
}
