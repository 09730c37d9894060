//! Serve command handler.

use anyhow::Result;
use toolgate_axum::bootstrap::{ServerConfig, start_server};

use crate::commands::ServeArgs;
use crate::error::CliError;

/// Turn `serve` arguments into a validated [`ServerConfig`].
///
/// The route prefix has no default: it must come from `--prefix` or
/// `PREFIX_URL`, and may be empty.
pub fn server_config(args: ServeArgs) -> Result<ServerConfig, CliError> {
    let prefix = args.prefix.ok_or_else(|| {
        CliError::Config("a route prefix is required (--prefix or PREFIX_URL)".to_string())
    })?;

    let mut config = ServerConfig::new(&prefix).map_err(|e| CliError::Config(e.to_string()))?;
    config.host = args.host;
    config.port = args.port;
    config.database_path = args.database;
    if let Some(catalog) = args.catalog {
        config = config.with_catalog_file(catalog);
    }
    if !args.allow_origins.is_empty() {
        config = config.with_allowed_origins(args.allow_origins);
    }
    Ok(config)
}

/// Execute the serve command. Runs until the listener fails.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = server_config(args)?;
    start_server(config).await
}
