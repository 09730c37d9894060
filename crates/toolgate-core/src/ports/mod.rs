//! Port definitions (trait abstractions) for external systems.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - Read-only: the core never writes configuration or credentials
//! - Implementations must tolerate concurrent reads from many sessions

mod credential_vault;
mod tool_store;

use thiserror::Error;

pub use credential_vault::CredentialVault;
pub use tool_store::ToolConfigStore;

#[cfg(test)]
pub use credential_vault::MockCredentialVault;
#[cfg(test)]
pub use tool_store::MockToolConfigStore;

/// Storage failure shared by the catalog ports.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend error (database, file, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored document could not be decoded.
    #[error("Corrupt record for '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}
