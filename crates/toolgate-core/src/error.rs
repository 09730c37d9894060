//! Resolution error taxonomy.

use thiserror::Error;

use crate::domain::TransportKind;
use crate::ports::StoreError;

/// Failure to turn a connector id into a launch spec.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The id has no tool name.
    #[error("Invalid connector id: {0:?}")]
    MalformedIdentifier(String),

    /// No tool configuration exists for the id's tool name.
    #[error("Invalid connector id: {0}")]
    UnknownConnector(String),

    /// The tool exists but cannot be launched as a subprocess.
    #[error("Connector '{tool}' uses unsupported transport '{transport}'")]
    UnsupportedTransport {
        tool: String,
        transport: TransportKind,
    },

    /// The tool catalog or credential vault failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
