//! Command handlers.
//!
//! Each handler exposes `execute(..) -> anyhow::Result<()>` and prints its
//! result for the terminal. Failures that deserve their own exit code are
//! raised as [`CliError`](crate::CliError).

pub mod import;
pub mod resolve;
pub mod serve;
