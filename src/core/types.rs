//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Coordinate`] - Validated WGS84 latitude/longitude pair
//! - [`CoordinateInput`] - Raw coordinate as it arrives from a request
//! - [`FeatureKind`] - Discriminant for search hits (stadium or state)
//! - [`NewPoint`] / [`PointAttributes`] - Validated mutation payloads
//! - [`SearchPattern`] - Escaped case-insensitive substring pattern
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so nothing malformed ever reaches the store.
//!
//! # Examples
//!
//! ```
//! use geoquery::core::types::{Coordinate, SearchPattern};
//!
//! let dallas = Coordinate::new(32.7767, -96.7970).unwrap();
//! assert_eq!(dallas.lat(), 32.7767);
//!
//! assert!(Coordinate::new(f64::NAN, 0.0).is_err());
//! assert!(Coordinate::new(91.0, 0.0).is_err());
//!
//! assert!(SearchPattern::contains("   ").is_none());
//! assert_eq!(SearchPattern::contains("tex").unwrap().as_like(), "%tex%");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("missing value")]
    Missing,
}

/// A WGS84 coordinate in decimal degrees.
///
/// Latitude must be within `[-90, 90]` and longitude within `[-180, 180]`.
/// Both must be finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// Create a validated coordinate.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCoordinate` if either component is
    /// non-finite or out of range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, TypeError> {
        Ok(Self {
            lat: Self::check_lat(lat)?,
            lng: Self::check_lng(lng)?,
        })
    }

    /// Validate a latitude on its own.
    pub fn check_lat(lat: f64) -> Result<f64, TypeError> {
        if !lat.is_finite() {
            return Err(TypeError::InvalidCoordinate(
                "latitude must be a finite number".into(),
            ));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(TypeError::InvalidCoordinate(format!(
                "latitude {} is outside [-90, 90]",
                lat
            )));
        }
        Ok(lat)
    }

    /// Validate a longitude on its own.
    pub fn check_lng(lng: f64) -> Result<f64, TypeError> {
        if !lng.is_finite() {
            return Err(TypeError::InvalidCoordinate(
                "longitude must be a finite number".into(),
            ));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(TypeError::InvalidCoordinate(format!(
                "longitude {} is outside [-180, 180]",
                lng
            )));
        }
        Ok(lng)
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

/// A coordinate component as received from a request.
///
/// JSON bodies may carry either `32.7` or `"32.7"`; query strings always
/// carry text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateInput {
    Number(f64),
    Text(String),
}

impl CoordinateInput {
    /// Parse into a finite `f64`.
    ///
    /// Blank text is reported as `TypeError::Missing` so callers can tell
    /// "not provided" apart from "not a number".
    pub fn parse(&self) -> Result<f64, TypeError> {
        let value = match self {
            CoordinateInput::Number(n) => *n,
            CoordinateInput::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(TypeError::Missing);
                }
                trimmed.parse::<f64>().map_err(|_| {
                    TypeError::InvalidCoordinate(format!("'{}' is not a number", trimmed))
                })?
            }
        };
        if !value.is_finite() {
            return Err(TypeError::InvalidCoordinate(format!(
                "{} is not a finite number",
                value
            )));
        }
        Ok(value)
    }
}

impl From<f64> for CoordinateInput {
    fn from(value: f64) -> Self {
        CoordinateInput::Number(value)
    }
}

impl From<&str> for CoordinateInput {
    fn from(value: &str) -> Self {
        CoordinateInput::Text(value.to_string())
    }
}

impl From<String> for CoordinateInput {
    fn from(value: String) -> Self {
        CoordinateInput::Text(value)
    }
}

/// Geometry kind of a search hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// A point feature
    Stadium,
    /// A polygon feature
    State,
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureKind::Stadium => write!(f, "stadium"),
            FeatureKind::State => write!(f, "state"),
        }
    }
}

/// A validated point feature ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPoint {
    pub name: String,
    pub city: String,
    pub region: String,
    pub location: Coordinate,
}

/// The mutable attributes of an existing point feature.
#[derive(Debug, Clone, PartialEq)]
pub struct PointAttributes {
    pub name: String,
    pub city: String,
    pub region: String,
}

/// A case-insensitive "contains" pattern for `ILIKE`.
///
/// User text is trimmed and the LIKE metacharacters `%`, `_` and `\` are
/// escaped, so the text always matches literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPattern {
    needle: String,
    like: String,
}

impl SearchPattern {
    /// Build a pattern from free text. Returns `None` for blank input.
    pub fn contains(query: &str) -> Option<Self> {
        let needle = query.trim();
        if needle.is_empty() {
            return None;
        }

        let mut like = String::with_capacity(needle.len() + 2);
        like.push('%');
        for c in needle.chars() {
            if matches!(c, '%' | '_' | '\\') {
                like.push('\\');
            }
            like.push(c);
        }
        like.push('%');

        Some(Self {
            needle: needle.to_string(),
            like,
        })
    }

    /// The trimmed user text.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// The escaped pattern to bind into an `ILIKE` predicate.
    pub fn as_like(&self) -> &str {
        &self.like
    }

    /// Evaluate the pattern against a value the way `ILIKE '%needle%'` does.
    pub fn matches(&self, candidate: &str) -> bool {
        candidate
            .to_lowercase()
            .contains(&self.needle.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod coordinate {
        use super::*;

        #[test]
        fn accepts_bounds() {
            assert!(Coordinate::new(90.0, 180.0).is_ok());
            assert!(Coordinate::new(-90.0, -180.0).is_ok());
            assert!(Coordinate::new(0.0, 0.0).is_ok());
        }

        #[test]
        fn rejects_non_finite() {
            assert!(Coordinate::new(f64::NAN, 0.0).is_err());
            assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
        }

        #[test]
        fn rejects_out_of_range() {
            assert!(Coordinate::new(90.5, 0.0).is_err());
            assert!(Coordinate::new(0.0, -180.1).is_err());
        }
    }

    mod coordinate_input {
        use super::*;

        #[test]
        fn parses_numbers_and_text() {
            assert_eq!(CoordinateInput::from(12.5).parse(), Ok(12.5));
            assert_eq!(CoordinateInput::from(" -97.1 ").parse(), Ok(-97.1));
        }

        #[test]
        fn blank_text_is_missing() {
            assert_eq!(CoordinateInput::from("  ").parse(), Err(TypeError::Missing));
        }

        #[test]
        fn garbage_is_invalid() {
            assert!(matches!(
                CoordinateInput::from("north").parse(),
                Err(TypeError::InvalidCoordinate(_))
            ));
            assert!(matches!(
                CoordinateInput::from("NaN").parse(),
                Err(TypeError::InvalidCoordinate(_))
            ));
            assert!(matches!(
                CoordinateInput::from("inf").parse(),
                Err(TypeError::InvalidCoordinate(_))
            ));
        }

        #[test]
        fn deserializes_either_shape() {
            let n: CoordinateInput = serde_json::from_str("32.5").unwrap();
            assert_eq!(n, CoordinateInput::Number(32.5));
            let s: CoordinateInput = serde_json::from_str("\"32.5\"").unwrap();
            assert_eq!(s, CoordinateInput::Text("32.5".into()));
        }
    }

    mod search_pattern {
        use super::*;

        #[test]
        fn blank_is_none() {
            assert!(SearchPattern::contains("").is_none());
            assert!(SearchPattern::contains(" \t ").is_none());
        }

        #[test]
        fn wraps_and_trims() {
            let p = SearchPattern::contains("  Dallas ").unwrap();
            assert_eq!(p.needle(), "Dallas");
            assert_eq!(p.as_like(), "%Dallas%");
        }

        #[test]
        fn escapes_metacharacters() {
            let p = SearchPattern::contains(r"50%_a\b").unwrap();
            assert_eq!(p.as_like(), r"%50\%\_a\\b%");
        }

        #[test]
        fn matches_case_insensitively() {
            let p = SearchPattern::contains("dALLas").unwrap();
            assert!(p.matches("AT&T Stadium, Dallas"));
            assert!(!p.matches("Houston"));
        }
    }

    #[test]
    fn feature_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FeatureKind::Stadium).unwrap(),
            "\"stadium\""
        );
        assert_eq!(FeatureKind::State.to_string(), "state");
    }
}
