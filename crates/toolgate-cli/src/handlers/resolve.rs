//! Resolve command handler.
//!
//! Shows what a session for a connector id would launch without spawning it.
//! Secret values never reach the terminal.

use anyhow::Result;
use toolgate_core::LaunchSpec;

use crate::bootstrap::CatalogSource;
use crate::error::CliError;

/// Render a launch spec for the terminal with assignment values masked.
pub fn render(spec: &LaunchSpec) -> Vec<String> {
    let mut lines = vec![format!("command: {}", spec.command)];
    lines.push(format!("args:    {}", spec.masked_args().join(" ")));
    if spec.env.is_empty() {
        lines.push("env:     (none)".to_string());
    } else {
        let names = spec.env.keys().map(String::as_str).collect::<Vec<_>>();
        lines.push(format!("env:     {}", names.join(", ")));
    }
    lines
}

/// Resolve `connector_id` against `source`.
pub async fn resolve(connector_id: &str, source: &CatalogSource) -> Result<LaunchSpec> {
    let resolver = source.open_resolver().await?;
    let spec = resolver
        .resolve_raw(connector_id)
        .await
        .map_err(|e| CliError::Resolution(e.to_string()))?;
    Ok(spec)
}

/// Execute the resolve command.
pub async fn execute(connector_id: &str, source: &CatalogSource) -> Result<()> {
    let spec = resolve(connector_id, source).await?;
    for line in render(&spec) {
        println!("{line}");
    }
    Ok(())
}
