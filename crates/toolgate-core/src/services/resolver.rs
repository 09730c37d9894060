//! Connector resolution: connector id -> launch spec.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{ConnectorId, CredentialQuery, LaunchSpec, LaunchTemplate, Secrets};
use crate::error::ResolutionError;
use crate::ports::{CredentialVault, ToolConfigStore};

/// Resolves connector ids into launch specs using the tool catalog and the
/// credential vault.
///
/// Holds no mutable state, so one instance is shared by every session.
pub struct ConnectorResolver {
    tools: Arc<dyn ToolConfigStore>,
    vault: Arc<dyn CredentialVault>,
}

impl ConnectorResolver {
    pub fn new(tools: Arc<dyn ToolConfigStore>, vault: Arc<dyn CredentialVault>) -> Self {
        Self { tools, vault }
    }

    /// Parse `raw` and resolve it.
    pub async fn resolve_raw(&self, raw: &str) -> Result<LaunchSpec, ResolutionError> {
        let id = ConnectorId::parse(raw)?;
        self.resolve(&id).await
    }

    /// Resolve a parsed connector id.
    ///
    /// The vault is only queried when the template declares secret-backed
    /// parameters. A missing credential record resolves as an empty secret
    /// mapping.
    pub async fn resolve(&self, id: &ConnectorId) -> Result<LaunchSpec, ResolutionError> {
        if let Some(remainder) = id.remainder() {
            debug!(
                connector_id = %id,
                remainder,
                "Ignoring trailing connector id segment"
            );
        }

        let config = self
            .tools
            .find_tool(id.tool_name())
            .await?
            .ok_or_else(|| ResolutionError::UnknownConnector(id.to_string()))?;

        let template =
            config
                .launch_template()
                .map_err(|transport| ResolutionError::UnsupportedTransport {
                    tool: id.tool_name().to_string(),
                    transport,
                })?;

        let secrets = self.secrets_for(id, &template).await?;
        let spec = LaunchSpec::build(&template, &secrets);

        debug!(
            connector_id = %id,
            command = %spec.command,
            arg_count = spec.args.len(),
            env_count = spec.env.len(),
            "Resolved launch spec"
        );

        Ok(spec)
    }

    async fn secrets_for(
        &self,
        id: &ConnectorId,
        template: &LaunchTemplate<'_>,
    ) -> Result<Secrets, ResolutionError> {
        if !template.needs_secrets() {
            return Ok(Secrets::new());
        }

        let query = CredentialQuery::for_connector(id);
        let record = self.vault.find_credentials(&query).await?;
        if record.is_none() {
            debug!(connector_id = %id, "No credential record found, using empty secrets");
        }

        Ok(record.map(|r| r.secrets).unwrap_or_default())
    }
}
