//! Import command handler.

use std::path::Path;

use anyhow::Result;
use toolgate_db::{CatalogFile, ImportSummary};
use tracing::info;

use crate::bootstrap::open_database;
use crate::error::CliError;

/// Load `file` and write it into the database at `database`.
///
/// Tools are upserted by name; credential records are appended.
pub async fn import(file: &Path, database: &Path) -> Result<ImportSummary> {
    let catalog = CatalogFile::load(file).await?;
    let store = open_database(database).await?;
    let summary = store
        .import(&catalog)
        .await
        .map_err(|e| CliError::Database(e.to_string()))?;
    info!(
        file = %file.display(),
        database = %database.display(),
        tools = summary.tools,
        credentials = summary.credentials,
        "Catalog imported"
    );
    Ok(summary)
}

/// Execute the import command.
pub async fn execute(file: &Path, database: &Path) -> Result<()> {
    let summary = import(file, database).await?;
    println!(
        "Imported {} tool(s) and {} credential record(s) into {}",
        summary.tools,
        summary.credentials,
        database.display()
    );
    Ok(())
}
