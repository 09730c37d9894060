//! Launch-spec assembly.
//!
//! Turns a [`LaunchTemplate`] and a secret mapping into the concrete command
//! line for a connector subprocess. The argument order is fixed:
//!
//! ```text
//! [a0, .., a(N-1), -e, K1=V1, -e, K2=V2, .., aN, --r1=v1, --r2=v2, ..]
//! ```
//!
//! Env flag pairs land immediately before the last base argument (or at the
//! end when there are no base args), runtime flags are appended after that.

use std::collections::BTreeMap;
use std::fmt;

use super::{LaunchTemplate, SecretSpec, Secrets};

/// Marker token preceding each `NAME=VALUE` env flag.
pub const ENV_FLAG: &str = "-e";

/// Fully resolved process launch parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl LaunchSpec {
    /// Build the launch spec for `template` using `secrets`.
    ///
    /// Specs whose secret cannot be resolved are skipped; they never produce
    /// an empty or default value.
    pub fn build(template: &LaunchTemplate<'_>, secrets: &Secrets) -> Self {
        let mut env = BTreeMap::new();
        let mut env_flags = Vec::with_capacity(template.env.len() * 2);
        for spec in template.env {
            if let Some(value) = resolve_secret(spec, secrets) {
                env.insert(spec.name.clone(), value.to_string());
                env_flags.push(ENV_FLAG.to_string());
                env_flags.push(format!("{}={value}", spec.name));
            }
        }

        let runtime_flags = template
            .runtime_args
            .iter()
            .filter_map(|spec| {
                resolve_secret(spec, secrets).map(|value| format!("--{}={value}", spec.name))
            })
            .collect::<Vec<_>>();

        let mut args = template.base_args.to_vec();
        insert_before_last(&mut args, env_flags);
        args.extend(runtime_flags);

        Self {
            command: template.command.to_string(),
            args,
            env,
        }
    }

    /// Arguments with the value half of every `NAME=VALUE` token masked.
    pub fn masked_args(&self) -> Vec<String> {
        self.args.iter().map(|arg| mask_assignment(arg)).collect()
    }
}

// Secret values stay out of logs.
impl fmt::Debug for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchSpec")
            .field("command", &self.command)
            .field("arg_count", &self.args.len())
            .field("env_names", &self.env.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Resolve a secret by exact name, then by each alias in declared order.
///
/// Empty values count as absent.
pub fn resolve_secret<'a>(spec: &SecretSpec, secrets: &'a Secrets) -> Option<&'a str> {
    std::iter::once(&spec.name)
        .chain(&spec.aliases)
        .find_map(|key| {
            secrets
                .get(key)
                .map(String::as_str)
                .filter(|value| !value.is_empty())
        })
}

/// Insert `tokens`, in order, just before the current last element of `args`.
///
/// With no last element the tokens are appended.
pub fn insert_before_last(args: &mut Vec<String>, tokens: impl IntoIterator<Item = String>) {
    match args.pop() {
        Some(last) => {
            args.extend(tokens);
            args.push(last);
        }
        None => args.extend(tokens),
    }
}

/// Mask the value of a `NAME=VALUE` token, leaving other tokens untouched.
pub fn mask_assignment(arg: &str) -> String {
    match arg.split_once('=') {
        Some((name, _)) => format!("{name}=***"),
        None => arg.to_string(),
    }
}
