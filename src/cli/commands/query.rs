//! Read-only query commands: count, counts, nearest, search

use anyhow::Result;

use super::{with_store, Context};
use crate::service::{NearestQuery, SpatialQueryService};

/// Count stadiums inside one state.
pub fn count(ctx: &Context, region: Option<String>) -> Result<u8> {
    with_store(ctx, |store| async move {
        SpatialQueryService::new(store)
            .count_in_region(region.as_deref())
            .await
    })
}

/// Count stadiums for every state.
pub fn counts(ctx: &Context) -> Result<u8> {
    with_store(ctx, |store| async move {
        SpatialQueryService::new(store).all_counts().await
    })
}

/// Nearest stadium to a coordinate.
pub fn nearest(ctx: &Context, lat: Option<String>, lng: Option<String>) -> Result<u8> {
    let query = NearestQuery {
        lat: lat.map(Into::into),
        lng: lng.map(Into::into),
    };
    with_store(ctx, |store| async move {
        SpatialQueryService::new(store).nearest(&query).await
    })
}

/// Attribute search over stadiums and states.
pub fn search(ctx: &Context, query: Option<String>) -> Result<u8> {
    let query = query.unwrap_or_default();
    with_store(ctx, |store| async move {
        SpatialQueryService::new(store).search(&query).await
    })
}
