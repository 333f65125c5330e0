//! ui
//!
//! Terminal output and diagnostics.
//!
//! # Modules
//!
//! - [`output`] - JSON responses on stdout and verbosity handling
//! - [`logging`] - `tracing` subscriber setup on stderr
//!
//! # Design
//!
//! Responses always go to stdout as JSON so they can be piped; logs and
//! warnings go to stderr and never mix with a response.

pub mod logging;
pub mod output;
