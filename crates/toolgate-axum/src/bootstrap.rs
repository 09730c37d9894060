//! Composition root: configuration, wiring, and server startup.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

use toolgate_core::{ConnectorResolver, CredentialVault, ToolConfigStore};
use toolgate_db::{CatalogFile, InMemoryCatalog, SqliteCatalog, setup_database};
use toolgate_mcp::{BridgeFactory, LineBridgeFactory, SessionManager, SessionSettings};

use crate::registry::SessionRegistry;

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default listen port.
pub const DEFAULT_PORT: u16 = 8200;
/// Default `SQLite` catalog location.
pub const DEFAULT_DATABASE_PATH: &str = "toolgate.db";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Route prefix must start with '/': {0:?}")]
    PrefixMissingSlash(String),

    #[error("Route prefix must not end with '/': {0:?}")]
    PrefixTrailingSlash(String),
}

#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    #[default]
    AllowAll,
    AllowOrigins(Vec<String>),
}

/// Server configuration, built once at startup and passed down.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Route prefix: empty, or `/`-prefixed without a trailing `/`.
    pub prefix: String,
    pub database_path: PathBuf,
    /// Serve this JSON catalog from memory instead of opening the database.
    pub catalog_file: Option<PathBuf>,
    pub session: SessionSettings,
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Defaults for everything except the route prefix, which is validated.
    pub fn new(prefix: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            prefix: validate_prefix(prefix)?,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            catalog_file: None,
            session: SessionSettings::default(),
            cors: CorsConfig::default(),
        })
    }

    #[must_use]
    pub fn with_catalog_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Check a route prefix. `"/"` is accepted as the empty prefix.
pub fn validate_prefix(prefix: &str) -> Result<String, ConfigError> {
    let prefix = prefix.trim();
    if prefix.is_empty() || prefix == "/" {
        return Ok(String::new());
    }
    if !prefix.starts_with('/') {
        return Err(ConfigError::PrefixMissingSlash(prefix.to_string()));
    }
    if prefix.ends_with('/') {
        return Err(ConfigError::PrefixTrailingSlash(prefix.to_string()));
    }
    Ok(prefix.to_string())
}

/// Everything the handlers need.
pub struct AxumContext {
    pub sessions: Arc<SessionManager>,
    pub registry: Arc<SessionRegistry>,
    pub prefix: String,
}

impl AxumContext {
    pub fn new(sessions: SessionManager, prefix: impl Into<String>) -> Self {
        Self {
            sessions: Arc::new(sessions),
            registry: Arc::new(SessionRegistry::new()),
            prefix: prefix.into(),
        }
    }

    /// Wire a context from the two catalog ports.
    pub fn from_catalog(
        tools: Arc<dyn ToolConfigStore>,
        vault: Arc<dyn CredentialVault>,
        bridges: Arc<dyn BridgeFactory>,
        settings: SessionSettings,
        prefix: impl Into<String>,
    ) -> Self {
        let resolver = Arc::new(ConnectorResolver::new(tools, vault));
        Self::new(SessionManager::new(resolver, bridges, settings), prefix)
    }

    /// URL clients post their messages to for `session_id`.
    pub fn message_endpoint(&self, session_id: &uuid::Uuid) -> String {
        format!(
            "{}/messages/?session_id={}",
            self.prefix,
            session_id.simple()
        )
    }
}

/// Build the context described by `config`.
pub async fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    let bridges: Arc<dyn BridgeFactory> = Arc::new(LineBridgeFactory);

    let ctx = if let Some(path) = &config.catalog_file {
        let catalog = CatalogFile::load(path).await?;
        let catalog = Arc::new(InMemoryCatalog::from(catalog));
        info!(
            catalog = %path.display(),
            tools = catalog.tool_count(),
            "Serving in-memory catalog"
        );
        AxumContext::from_catalog(
            catalog.clone(),
            catalog,
            bridges,
            config.session.clone(),
            &config.prefix,
        )
    } else {
        let pool = setup_database(&config.database_path)
            .await
            .with_context(|| format!("opening {}", config.database_path.display()))?;
        let catalog = Arc::new(SqliteCatalog::new(pool));
        info!(database = %config.database_path.display(), "Serving SQLite catalog");
        AxumContext::from_catalog(
            catalog.clone(),
            catalog,
            bridges,
            config.session.clone(),
            &config.prefix,
        )
    };

    Ok(ctx)
}

pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;

    let ctx = bootstrap(&config).await?;
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(
        "toolgate listening on http://{}{}/sse/{{connector_id}}",
        addr, config.prefix
    );

    axum::serve(listener, app).await?;
    Ok(())
}
