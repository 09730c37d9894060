//! Tool configuration lookup.

use async_trait::async_trait;

use super::StoreError;
use crate::domain::ToolConfiguration;

/// Read access to per-tool launch templates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolConfigStore: Send + Sync {
    /// Look up the configuration for an exact tool name.
    ///
    /// Returns `Ok(None)` on a lookup miss.
    async fn find_tool(&self, name: &str) -> Result<Option<ToolConfiguration>, StoreError>;
}
