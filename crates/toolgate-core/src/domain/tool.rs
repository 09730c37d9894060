//! Declarative tool configuration.
//!
//! These are the launch templates persisted in the tool catalog, one per
//! tool name. Field names follow the stored document shape:
//!
//! ```json
//! {
//!   "transport": "stdio",
//!   "command": "docker",
//!   "args": ["run", "-i", "--rm", "ghcr.io/acme/tool"],
//!   "runtime_args": [{ "name": "workspace", "alias": ["WORKSPACE_ID"] }],
//!   "env": [{ "name": "API_TOKEN", "alias": ["TOKEN"] }]
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a connector is reached. Only stdio connectors can be launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransportKind {
    /// Subprocess speaking line-delimited messages over stdin/stdout.
    Stdio,
    /// Any other declared kind. Kept verbatim so it can be reported.
    Other(String),
}

impl Default for TransportKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for TransportKind {
    fn from(value: String) -> Self {
        if value == "stdio" {
            Self::Stdio
        } else {
            Self::Other(value)
        }
    }
}

impl From<TransportKind> for String {
    fn from(value: TransportKind) -> Self {
        match value {
            TransportKind::Stdio => "stdio".to_string(),
            TransportKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => f.write_str("stdio"),
            Self::Other(kind) if kind.is_empty() => f.write_str("<unset>"),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

/// A secret-backed launch parameter: a primary name plus fallback aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretSpec {
    pub name: String,
    /// Alternate secret keys, tried in order when `name` is absent.
    #[serde(default, rename = "alias")]
    pub aliases: Vec<String>,
}

impl SecretSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// Launch template for one tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfiguration {
    #[serde(default)]
    pub transport: TransportKind,
    #[serde(default)]
    pub command: String,
    /// Base arguments; env flags are spliced in before the last one.
    #[serde(default, rename = "args")]
    pub base_args: Vec<String>,
    /// Secrets rendered as trailing `--NAME=VALUE` flags.
    #[serde(default)]
    pub runtime_args: Vec<SecretSpec>,
    /// Secrets injected as environment variables and `-e NAME=VALUE` pairs.
    #[serde(default)]
    pub env: Vec<SecretSpec>,
}

impl ToolConfiguration {
    /// Create a stdio configuration with no secret-backed parameters.
    pub fn stdio(command: impl Into<String>, base_args: Vec<String>) -> Self {
        Self {
            transport: TransportKind::Stdio,
            command: command.into(),
            base_args,
            runtime_args: Vec::new(),
            env: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_env(mut self, spec: SecretSpec) -> Self {
        self.env.push(spec);
        self
    }

    #[must_use]
    pub fn with_runtime_arg(mut self, spec: SecretSpec) -> Self {
        self.runtime_args.push(spec);
        self
    }

    /// Borrow the launchable view of this configuration.
    ///
    /// Fails with the declared transport when it is not stdio; a template can
    /// only be obtained for something that can actually be spawned.
    pub fn launch_template(&self) -> Result<LaunchTemplate<'_>, TransportKind> {
        match self.transport {
            TransportKind::Stdio => Ok(LaunchTemplate {
                command: &self.command,
                base_args: &self.base_args,
                runtime_args: &self.runtime_args,
                env: &self.env,
            }),
            TransportKind::Other(_) => Err(self.transport.clone()),
        }
    }
}

/// Validated stdio view of a [`ToolConfiguration`].
#[derive(Debug, Clone, Copy)]
pub struct LaunchTemplate<'a> {
    pub command: &'a str,
    pub base_args: &'a [String],
    pub runtime_args: &'a [SecretSpec],
    pub env: &'a [SecretSpec],
}

impl LaunchTemplate<'_> {
    /// Whether any parameter depends on the credential vault.
    pub const fn needs_secrets(&self) -> bool {
        !self.runtime_args.is_empty() || !self.env.is_empty()
    }
}

/// A named tool configuration as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDocument {
    pub name: String,
    #[serde(default)]
    pub configurations: ToolConfiguration,
}
