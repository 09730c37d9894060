//! Catalog wiring for the one-shot commands.
//!
//! `serve` hands its configuration to `toolgate_axum::bootstrap`; `import`
//! and `resolve` open a catalog here.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use toolgate_core::ConnectorResolver;
use toolgate_db::{CatalogFile, InMemoryCatalog, SqliteCatalog, setup_database};
use tracing::debug;

use crate::error::CliError;

/// Where tool configurations and credentials come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Database(PathBuf),
    File(PathBuf),
}

impl CatalogSource {
    /// Build a resolver over this catalog.
    pub async fn open_resolver(&self) -> Result<ConnectorResolver> {
        match self {
            Self::Database(path) => {
                let catalog = Arc::new(open_database(path).await?);
                Ok(ConnectorResolver::new(catalog.clone(), catalog))
            }
            Self::File(path) => {
                let catalog = Arc::new(InMemoryCatalog::from(CatalogFile::load(path).await?));
                debug!(tools = catalog.tool_count(), "Loaded catalog file");
                Ok(ConnectorResolver::new(catalog.clone(), catalog))
            }
        }
    }
}

/// Open (creating if needed) the `SQLite` catalog at `path`.
pub async fn open_database(path: &Path) -> Result<SqliteCatalog> {
    let pool = setup_database(path)
        .await
        .map_err(|e| CliError::Database(format!("{}: {e:#}", path.display())))?;
    debug!(database = %path.display(), "Opened catalog database");
    Ok(SqliteCatalog::new(pool))
}
