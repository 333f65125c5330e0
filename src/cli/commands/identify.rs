//! identify command - WMS GetFeatureInfo passthrough

use anyhow::Result;

use super::{respond, Context};
use crate::service::ServiceError;
use crate::upstream::{FeatureInfoProxy, FeatureInfoRequest, FeatureInfoSettings};

/// Identify the feature under a map pixel.
///
/// Needs no store; only the feature-info settings are read.
pub fn identify(ctx: &Context, request: FeatureInfoRequest) -> Result<u8> {
    let settings = FeatureInfoSettings::from(&ctx.config);
    tracing::debug!(endpoint = %settings.endpoint, "identify");

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        let proxy = FeatureInfoProxy::new(settings).map_err(ServiceError::from)?;
        proxy.identify(&request).await
    });
    respond(result)
}
