//! JSON catalog documents.
//!
//! A catalog file bundles tool configurations and credential records:
//!
//! ```json
//! {
//!   "tools": [
//!     { "name": "github", "configurations": { "transport": "stdio", "command": "docker", "args": ["run", "-i", "image"] } }
//!   ],
//!   "credentials": [
//!     { "tool_name": "github", "user_id": "u1", "secrets": { "GITHUB_TOKEN": "..." } }
//!   ]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use toolgate_core::{CredentialRecord, ToolDocument};

/// Tool configurations and credentials loaded from one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub tools: Vec<ToolDocument>,
    #[serde(default)]
    pub credentials: Vec<CredentialRecord>,
}

impl CatalogFile {
    /// Read and parse a catalog file.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Invalid catalog file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use toolgate_core::TransportKind;

    const SAMPLE: &str = r#"{
        "tools": [
            {"name": "github", "configurations": {"transport": "stdio", "command": "docker", "args": ["run", "image"]}},
            {"name": "remote", "configurations": {"transport": "http"}}
        ],
        "credentials": [
            {"tool_name": "github", "user_id": "u1", "secrets": {"TOKEN": "t"}}
        ]
    }"#;

    #[test]
    fn parses_tools_and_credentials() {
        let catalog = CatalogFile::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.tools.len(), 2);
        assert_eq!(catalog.tools[0].configurations.transport, TransportKind::Stdio);
        assert_eq!(catalog.credentials[0].user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn empty_document_is_an_empty_catalog() {
        let catalog = CatalogFile::from_json("{}").unwrap();
        assert!(catalog.tools.is_empty());
        assert!(catalog.credentials.is_empty());
    }

    #[tokio::test]
    async fn load_reports_the_offending_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();

        let err = CatalogFile::load(file.path()).await.unwrap_err();
        assert!(format!("{err:#}").contains(&file.path().display().to_string()));
    }
}
