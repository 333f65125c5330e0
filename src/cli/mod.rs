//! cli
//!
//! Command-line interface layer for geoquery.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install logging and resolve configuration
//! - Delegate to command handlers
//! - Does NOT validate request values or touch the store directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::service`] layer. Every outcome is printed as JSON and mapped to
//! an exit status (see [`commands`]).

pub mod args;
pub mod commands;

pub use args::{Cli, Command, Shell};

use std::process::ExitCode;

use crate::core::config::{Config, ConfigError};
use crate::ui::{logging, output::Verbosity};
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse_args();
    logging::init_logging(Verbosity::from_flags(cli.quiet, cli.debug));

    // Completion needs no configuration.
    if let Command::Completion { shell } = &cli.command {
        commands::completion(*shell)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(err) => return Ok(ExitCode::from(commands::report_config_error(&err)?)),
    };
    if let Some(path) = config.loaded_from() {
        tracing::debug!(path = %path.display(), "loaded config file");
    }

    let ctx = commands::Context { config };
    let status = commands::dispatch(cli.command, &ctx)?;
    Ok(ExitCode::from(status))
}

/// Load configuration and apply the `--database-url` flag.
fn resolve_config(cli: &Cli) -> Result<Config, ConfigError> {
    let config = Config::load(cli.config.as_deref())?;
    match &cli.database_url {
        Some(url) => config.with_database_url(url.clone()),
        None => Ok(config),
    }
}
