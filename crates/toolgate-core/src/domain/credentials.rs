//! Credential records scoped to a (tool, user) pair.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ConnectorId;

/// Secret name to secret value.
pub type Secrets = BTreeMap<String, String>;

/// Secret bundle for one tool, optionally scoped to a user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub tool_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub secrets: Secrets,
}

impl CredentialRecord {
    pub fn new(tool_name: impl Into<String>, user_id: Option<String>, secrets: Secrets) -> Self {
        Self {
            tool_name: tool_name.into(),
            user_id,
            secrets,
        }
    }
}

// Secret values stay out of logs.
impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("tool_name", &self.tool_name)
            .field("user_id", &self.user_id)
            .field("secret_names", &self.secrets.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Vault lookup filter: tool name AND, when present, user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialQuery {
    pub tool_name: String,
    pub user_id: Option<String>,
}

impl CredentialQuery {
    pub fn for_connector(id: &ConnectorId) -> Self {
        Self {
            tool_name: id.tool_name().to_string(),
            user_id: id.user_id().map(str::to_string),
        }
    }

    /// Whether a record satisfies every filter in this query.
    pub fn matches(&self, record: &CredentialRecord) -> bool {
        if record.tool_name != self.tool_name {
            return false;
        }
        match &self.user_id {
            Some(user) => record.user_id.as_deref() == Some(user.as_str()),
            None => true,
        }
    }
}
