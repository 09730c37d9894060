//! Core domain for toolgate.
//!
//! Holds the connector identifier grammar, the declarative tool
//! configuration schema, credential records, launch-spec assembly and the
//! resolver service that ties them together. Nothing in here touches a
//! database, a process or a socket; adapters live in sibling crates.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    CONNECTOR_ID_DELIMITER, ConnectorId, CredentialQuery, CredentialRecord, ENV_FLAG, LaunchSpec,
    LaunchTemplate, SecretSpec, Secrets, SessionState, ToolConfiguration, ToolDocument,
    TransportKind, insert_before_last, mask_assignment, resolve_secret,
};
pub use error::ResolutionError;
pub use ports::{CredentialVault, StoreError, ToolConfigStore};
pub use services::ConnectorResolver;
