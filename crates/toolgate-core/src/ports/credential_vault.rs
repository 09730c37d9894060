//! Credential lookup.

use async_trait::async_trait;

use super::StoreError;
use crate::domain::{CredentialQuery, CredentialRecord};

/// Read access to per-(tool, user) secrets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialVault: Send + Sync {
    /// Return the first record matching every filter in `query`.
    async fn find_credentials(
        &self,
        query: &CredentialQuery,
    ) -> Result<Option<CredentialRecord>, StoreError>;
}
