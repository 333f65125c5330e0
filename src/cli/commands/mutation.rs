//! Mutation commands: create, update

use anyhow::Result;

use super::{with_store, Context};
use crate::service::{CreatePointRequest, MutationService, UpdatePointRequest};

/// Create a stadium.
pub fn create(ctx: &Context, request: CreatePointRequest) -> Result<u8> {
    with_store(ctx, |store| async move {
        MutationService::new(store).create(&request).await
    })
}

/// Update a stadium's attributes.
pub fn update(ctx: &Context, id: i64, request: UpdatePointRequest) -> Result<u8> {
    with_store(ctx, |store| async move {
        MutationService::new(store).update(id, &request).await
    })
}
