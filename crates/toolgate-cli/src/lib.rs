//! `toolgate` command-line interface.
//!
//! - `serve` (default): run the HTTP surface.
//! - `import`: load a JSON catalog into the `SQLite` database.
//! - `resolve`: print the launch spec a connector id resolves to, secrets masked.

#![deny(unsafe_code)]

#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;

// Used by the binary target only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

pub use bootstrap::CatalogSource;
pub use commands::{Commands, ServeArgs};
pub use error::CliError;
pub use parser::Cli;
