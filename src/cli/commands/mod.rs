//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Collects its arguments into the service request type
//! 2. Calls the service on a tokio runtime
//! 3. Prints the JSON response and returns the process exit status
//!
//! Handlers do NOT validate request values; the services do. The store URL
//! is checked only when a request reaches the store.
//!
//! # Exit Status
//!
//! - `0`: success
//! - `2`: client error (validation, not found)
//! - `1`: server error (store, gateway, configuration)

mod completion;
mod identify;
mod mutation;
mod query;
mod store;

pub use completion::completion;
pub use identify::identify;
pub use mutation::{create, update};
pub use query::{count, counts, nearest, search};

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::cli::args::Command;
use crate::core::config::{Config, ConfigError};
use crate::service::{ErrorResponse, ServiceError};
use crate::store::GeometryStore;
use store::Resolved;
use crate::ui::output;

/// Exit status for success.
pub const EXIT_OK: u8 = 0;
/// Exit status for server-side failures.
pub const EXIT_SERVER_ERROR: u8 = 1;
/// Exit status for client-side failures.
pub const EXIT_CLIENT_ERROR: u8 = 2;

/// Per-invocation context built from global flags.
pub struct Context {
    pub config: Config,
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<u8> {
    match command {
        Command::Count { region } => count(ctx, region),
        Command::Counts => counts(ctx),
        Command::Nearest { lat, lng } => nearest(ctx, lat, lng),
        Command::Search { query } => search(ctx, query),
        Command::Create {
            name,
            city,
            region,
            lat,
            lng,
        } => create(
            ctx,
            crate::service::CreatePointRequest {
                name,
                city,
                region,
                lat: lat.map(Into::into),
                lng: lng.map(Into::into),
            },
        ),
        Command::Update {
            id,
            name,
            city,
            region,
        } => update(
            ctx,
            id,
            crate::service::UpdatePointRequest { name, city, region },
        ),
        Command::Identify {
            bbox,
            width,
            height,
            x,
            y,
        } => identify(
            ctx,
            crate::upstream::FeatureInfoRequest {
                bbox,
                width,
                height,
                x,
                y,
            },
        ),
        Command::Completion { shell } => {
            completion(shell)?;
            Ok(EXIT_OK)
        }
    }
}

/// Exit status for a service error.
pub fn exit_status(err: &ServiceError) -> u8 {
    if err.is_client_error() {
        EXIT_CLIENT_ERROR
    } else {
        EXIT_SERVER_ERROR
    }
}

/// Print a service result and map it to an exit status.
pub(crate) fn respond<T: Serialize>(result: Result<T, ServiceError>) -> Result<u8> {
    match result {
        Ok(value) => {
            output::print_json(&value)?;
            Ok(EXIT_OK)
        }
        Err(err) => {
            tracing::debug!(kind = err.kind(), error = %err, "request failed");
            output::print_json(&err.to_response())?;
            Ok(exit_status(&err))
        }
    }
}

/// Print a configuration failure as a structured error.
pub fn report_config_error(err: &ConfigError) -> Result<u8> {
    output::print_json(&ErrorResponse {
        status: "error",
        kind: "config",
        message: err.to_string(),
        field: None,
        cause: None,
    })?;
    Ok(EXIT_SERVER_ERROR)
}

/// Run a store-backed request on a fresh runtime.
///
/// The store URL is resolved lazily: a request that fails validation, or
/// never needs the store, is answered even when no URL is configured. Only
/// a call that reaches the store reports the missing URL.
pub(crate) fn with_store<T, F, Fut>(ctx: &Context, call: F) -> Result<u8>
where
    T: Serialize,
    F: FnOnce(Arc<dyn GeometryStore>) -> Fut,
    Fut: std::future::Future<Output = std::result::Result<T, ServiceError>>,
{
    let rt = tokio::runtime::Runtime::new()?;
    let (resolved, result) = rt.block_on(async {
        let resolved = match Resolved::from_config(&ctx.config) {
            Ok(resolved) => resolved,
            Err(err) => return (None, Err(err)),
        };
        let result = call(resolved.handle()).await;
        (Some(resolved), result)
    });

    if let (Some(resolved), Err(ServiceError::Store(_))) = (&resolved, &result) {
        if let Some(err) = resolved.config_error() {
            return report_config_error(err);
        }
    }
    respond(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn client_errors_exit_two() {
        assert_eq!(exit_status(&ServiceError::missing("lat")), EXIT_CLIENT_ERROR);
        assert_eq!(
            exit_status(&ServiceError::NotFound("stadium 3".into())),
            EXIT_CLIENT_ERROR
        );
    }

    #[test]
    fn server_errors_exit_one() {
        assert_eq!(
            exit_status(&ServiceError::Store(StoreError::Connection("refused".into()))),
            EXIT_SERVER_ERROR
        );
    }

    #[test]
    fn missing_url_is_config_error_once_the_store_is_called() {
        let ctx = Context {
            config: Config::default(),
        };
        let status = with_store(&ctx, |store| async move {
            store.count_per_region().await.map_err(ServiceError::from)
        })
        .unwrap();
        assert_eq!(status, EXIT_SERVER_ERROR);
    }

    #[test]
    fn missing_url_does_not_mask_validation() {
        let ctx = Context {
            config: Config::default(),
        };
        let status = with_store(&ctx, |_store| async {
            Err::<(), _>(ServiceError::missing("lat"))
        })
        .unwrap();
        assert_eq!(status, EXIT_CLIENT_ERROR);

        let status = with_store(&ctx, |_store| async { Ok::<_, ServiceError>(()) }).unwrap();
        assert_eq!(status, EXIT_OK);
    }
}
