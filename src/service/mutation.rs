//! service::mutation
//!
//! Validated create and update of point features.
//!
//! # Design
//!
//! Every field is checked before the store is touched: first that each
//! required field is present and non-blank, then that coordinates parse
//! and are in range. A rejected request therefore never produces a
//! partial insert.
//!
//! Identifier assignment belongs to the store, which reads the current
//! maximum and inserts in one transaction. Updates report
//! `ServiceError::NotFound` when no row carries the identifier.
//!
//! Attribute values are user text and are only logged at debug level.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::ServiceError;
use super::{parse_coordinate, require_present, required_text};
use crate::core::types::{CoordinateInput, NewPoint, PointAttributes};
use crate::store::GeometryStore;

/// Raw create request.
///
/// `state` is accepted as an alias for `region`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreatePointRequest {
    pub name: Option<String>,
    pub city: Option<String>,
    #[serde(alias = "state")]
    pub region: Option<String>,
    pub lat: Option<CoordinateInput>,
    pub lng: Option<CoordinateInput>,
}

impl CreatePointRequest {
    fn validate(&self) -> Result<NewPoint, ServiceError> {
        let name = required_text("name", self.name.as_deref())?;
        let city = required_text("city", self.city.as_deref())?;
        let region = required_text("region", self.region.as_deref())?;
        require_present("lat", self.lat.as_ref())?;
        require_present("lng", self.lng.as_ref())?;

        Ok(NewPoint {
            name: name.to_string(),
            city: city.to_string(),
            region: region.to_string(),
            location: parse_coordinate(self.lat.as_ref(), self.lng.as_ref())?,
        })
    }
}

/// Raw update request; the identifier travels separately.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdatePointRequest {
    pub name: Option<String>,
    pub city: Option<String>,
    #[serde(alias = "state")]
    pub region: Option<String>,
}

impl UpdatePointRequest {
    fn validate(&self) -> Result<PointAttributes, ServiceError> {
        Ok(PointAttributes {
            name: required_text("name", self.name.as_deref())?.to_string(),
            city: required_text("city", self.city.as_deref())?.to_string(),
            region: required_text("region", self.region.as_deref())?.to_string(),
        })
    }
}

/// Acknowledgement of a committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationAck {
    /// Always `"success"`
    pub status: &'static str,
    pub message: String,
    /// Identifier of the created or updated feature
    pub id: i64,
}

impl MutationAck {
    fn new(message: impl Into<String>, id: i64) -> Self {
        Self {
            status: "success",
            message: message.into(),
            id,
        }
    }
}

/// Create and update point features.
#[derive(Clone)]
pub struct MutationService {
    store: Arc<dyn GeometryStore>,
}

impl std::fmt::Debug for MutationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationService")
            .field("store", &self.store.name())
            .finish()
    }
}

impl MutationService {
    /// Create a service over `store`.
    pub fn new(store: Arc<dyn GeometryStore>) -> Self {
        Self { store }
    }

    /// Insert a new open point feature.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for a missing field or an invalid
    ///   coordinate (nothing is written)
    /// - `ServiceError::Store` if the insert or commit fails
    #[tracing::instrument(skip_all)]
    pub async fn create(&self, request: &CreatePointRequest) -> Result<MutationAck, ServiceError> {
        let point = request.validate()?;
        tracing::debug!(name = %point.name, "creating point feature");

        let id = self.store.insert_point(&point).await?;
        tracing::info!(id, "point feature created");
        Ok(MutationAck::new("Stadium created", id))
    }

    /// Replace name, city and region of an existing point feature.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for a missing field (nothing is written)
    /// - `ServiceError::NotFound` if no feature has this identifier
    /// - `ServiceError::Store` if the update or commit fails
    #[tracing::instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: i64,
        request: &UpdatePointRequest,
    ) -> Result<MutationAck, ServiceError> {
        let attrs = request.validate()?;

        let affected = self.store.update_point(id, &attrs).await?;
        if affected == 0 {
            tracing::debug!(id, "no point feature to update");
            return Err(ServiceError::NotFound(format!("stadium {}", id)));
        }

        tracing::info!(id, "point feature updated");
        Ok(MutationAck::new("Stadium updated", id))
    }
}
