//! Process supervision errors.

use std::io;

use thiserror::Error;

/// The connector subprocess could not be started.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("Failed to spawn '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Connector process has no {0} pipe")]
    MissingPipe(&'static str),
}

/// Failure while stopping a connector subprocess.
///
/// Always non-fatal: teardown records it and the session outcome is unchanged.
#[derive(Debug, Error)]
pub enum TerminationError {
    #[error("Failed to signal process {pid}: {reason}")]
    Signal { pid: u32, reason: String },

    #[error("Failed to kill process: {0}")]
    Kill(#[source] io::Error),

    #[error("Failed waiting for process exit: {0}")]
    Wait(#[source] io::Error),
}
