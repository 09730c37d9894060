//! Catalog storage for toolgate.
//!
//! Implements the core [`ToolConfigStore`](toolgate_core::ToolConfigStore) and
//! [`CredentialVault`](toolgate_core::CredentialVault) ports, backed either by
//! `SQLite` or by an in-memory catalog loaded from a JSON file.

#![deny(unsafe_code)]

pub mod catalog_file;
pub mod memory;
pub mod repositories;
pub mod setup;

pub use catalog_file::CatalogFile;
pub use memory::InMemoryCatalog;
pub use repositories::{ImportSummary, SqliteCatalog};

// Re-export setup functions for convenient access
pub use setup::setup_database;
#[cfg(test)]
pub use setup::setup_test_database;
