//! Domain types.
//!
//! Plain data plus the pure functions that operate on it. Serialization
//! shapes match the documents persisted by the tool catalog.

mod connector;
mod credentials;
mod launch;
mod session;
mod tool;

pub use connector::{CONNECTOR_ID_DELIMITER, ConnectorId};
pub use credentials::{CredentialQuery, CredentialRecord, Secrets};
pub use launch::{ENV_FLAG, LaunchSpec, insert_before_last, mask_assignment, resolve_secret};
pub use session::SessionState;
pub use tool::{LaunchTemplate, SecretSpec, ToolConfiguration, ToolDocument, TransportKind};
