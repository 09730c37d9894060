//! In-memory catalog.
//!
//! Read-only after construction, so concurrent sessions share it without
//! locking.

use std::collections::HashMap;

use async_trait::async_trait;
use toolgate_core::{
    CredentialQuery, CredentialRecord, CredentialVault, StoreError, ToolConfigStore,
    ToolConfiguration,
};

use crate::CatalogFile;

/// Tool configurations and credentials held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    tools: HashMap<String, ToolConfiguration>,
    credentials: Vec<CredentialRecord>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tool(mut self, name: impl Into<String>, config: ToolConfiguration) -> Self {
        self.tools.insert(name.into(), config);
        self
    }

    /// Add a credential record. Earlier records win on lookup.
    #[must_use]
    pub fn with_credentials(mut self, record: CredentialRecord) -> Self {
        self.credentials.push(record);
        self
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

impl From<CatalogFile> for InMemoryCatalog {
    fn from(file: CatalogFile) -> Self {
        let tools = file
            .tools
            .into_iter()
            .map(|doc| (doc.name, doc.configurations))
            .collect();
        Self {
            tools,
            credentials: file.credentials,
        }
    }
}

#[async_trait]
impl ToolConfigStore for InMemoryCatalog {
    async fn find_tool(&self, name: &str) -> Result<Option<ToolConfiguration>, StoreError> {
        Ok(self.tools.get(name).cloned())
    }
}

#[async_trait]
impl CredentialVault for InMemoryCatalog {
    async fn find_credentials(
        &self,
        query: &CredentialQuery,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self
            .credentials
            .iter()
            .find(|record| query.matches(record))
            .cloned())
    }
}
