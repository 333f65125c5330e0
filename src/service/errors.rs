//! service::errors
//!
//! Request-level error taxonomy and its boundary translation.
//!
//! # Design
//!
//! Every service operation fails with exactly one [`ServiceError`]:
//!
//! | Variant      | Cause                              | Status |
//! |--------------|------------------------------------|--------|
//! | `Validation` | missing or malformed input         | 400    |
//! | `NotFound`   | well-formed request, no data       | 404    |
//! | `Store`      | backing store failure              | 500    |
//! | `Gateway`    | upstream map service failure       | 502    |
//!
//! All of them are terminal for the request; nothing is retried.
//!
//! Store and gateway messages are already credential-free by the time
//! they get here; [`ErrorResponse`] adds a generic message on top so the
//! cause is diagnosable without being the headline.
//!
//! # Example
//!
//! ```
//! use geoquery::service::ServiceError;
//!
//! let err = ServiceError::missing("lat");
//! assert_eq!(err.status_code(), 400);
//! assert!(err.is_client_error());
//!
//! let body = err.to_response();
//! assert_eq!(body.field.as_deref(), Some("lat"));
//! ```

use serde::Serialize;
use thiserror::Error;

use crate::core::types::TypeError;
use crate::store::StoreError;
use crate::upstream::GatewayError;

/// Message for a required field that is absent or blank.
pub const MISSING_FIELD: &str = "missing required field";

/// Errors from service operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// Missing or malformed input.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending input field
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// The request was well formed but matched nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The upstream map service failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ServiceError {
    /// A required field is absent or blank.
    pub fn missing(field: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.into(),
            message: MISSING_FIELD.to_string(),
        }
    }

    /// A field is present but malformed.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Translate a type validation failure for `field`.
    pub fn from_type_error(field: impl Into<String>, err: TypeError) -> Self {
        match err {
            TypeError::Missing => Self::missing(field),
            TypeError::InvalidCoordinate(message) => Self::invalid(field, message),
        }
    }

    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation { .. } => "validation",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Store(_) => "store",
            ServiceError::Gateway(_) => "gateway",
        }
    }

    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation { .. } => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Store(_) => 500,
            ServiceError::Gateway(_) => 502,
        }
    }

    /// Whether the caller can fix this by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::Validation { .. } | ServiceError::NotFound(_)
        )
    }

    /// Structured body for the boundary.
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            ServiceError::Validation { field, message } => ErrorResponse {
                status: "error",
                kind: self.kind(),
                message: format!("{}: {}", field, message),
                field: Some(field.clone()),
                cause: None,
            },
            ServiceError::NotFound(what) => ErrorResponse {
                status: "error",
                kind: self.kind(),
                message: format!("{} not found", what),
                field: None,
                cause: None,
            },
            ServiceError::Store(err) => ErrorResponse {
                status: "error",
                kind: self.kind(),
                message: "the spatial store could not complete the request".to_string(),
                field: None,
                cause: Some(err.to_string()),
            },
            ServiceError::Gateway(err) => ErrorResponse {
                status: "error",
                kind: self.kind(),
                message: "could not retrieve feature info from the map service".to_string(),
                field: None,
                cause: Some(err.to_string()),
            },
        }
    }
}

/// Error body returned at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    /// Always `"error"`
    pub status: &'static str,
    /// One of `validation`, `not_found`, `store`, `gateway`
    pub kind: &'static str,
    /// Human-readable summary
    pub message: String,
    /// Offending input field, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Underlying failure, for store and gateway errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}
