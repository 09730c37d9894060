//! Subcommands and their argument groups.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use toolgate_axum::bootstrap::{DEFAULT_DATABASE_PATH, DEFAULT_HOST, DEFAULT_PORT};

use crate::bootstrap::CatalogSource;

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the SSE bridge (default)
    Serve(ServeArgs),

    /// Import a JSON catalog of tools and credentials into the database
    Import {
        /// Catalog file ({"tools": [...], "credentials": [...]})
        file: PathBuf,
        /// SQLite database to write into
        #[arg(long, env = "TOOLGATE_DATABASE_PATH", default_value = DEFAULT_DATABASE_PATH)]
        database: PathBuf,
    },

    /// Show the launch command a connector id resolves to, secrets masked
    Resolve {
        /// Connector id, e.g. "github-u1"
        connector_id: String,
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Options for `serve`.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Route prefix, e.g. "/mcp" (empty for none)
    #[arg(long, env = "PREFIX_URL")]
    pub prefix: Option<String>,

    /// SQLite catalog database
    #[arg(long, env = "TOOLGATE_DATABASE_PATH", default_value = DEFAULT_DATABASE_PATH)]
    pub database: PathBuf,

    /// Serve this JSON catalog from memory instead of the database
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Allowed CORS origin; repeat for several (default: any)
    #[arg(long = "allow-origin")]
    pub allow_origins: Vec<String>,
}

/// Where `resolve` reads tools and credentials from.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// SQLite catalog database
    #[arg(long, env = "TOOLGATE_DATABASE_PATH", default_value = DEFAULT_DATABASE_PATH)]
    pub database: PathBuf,

    /// JSON catalog file; takes precedence over --database
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

impl SourceArgs {
    pub fn catalog_source(&self) -> CatalogSource {
        match &self.catalog {
            Some(path) => CatalogSource::File(path.clone()),
            None => CatalogSource::Database(self.database.clone()),
        }
    }
}
