//! `SQLite` implementation of the tool catalog and credential vault.
//!
//! Tool configurations are stored as their JSON document. Secret values are
//! stored base64-encoded inside a JSON object (encoding, not encryption).

use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use toolgate_core::{
    CredentialQuery, CredentialRecord, CredentialVault, Secrets, StoreError, ToolConfigStore,
    ToolConfiguration,
};

use crate::CatalogFile;

/// `SQLite`-backed catalog. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

/// Counts of rows written by [`SqliteCatalog::import`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub tools: usize,
    pub credentials: usize,
}

impl SqliteCatalog {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace the configuration for `name`.
    pub async fn upsert_tool(
        &self,
        name: &str,
        config: &ToolConfiguration,
    ) -> Result<(), StoreError> {
        upsert_tool_with(&self.pool, name, config).await
    }

    /// Append a credential record. Earlier records win on lookup.
    pub async fn insert_credentials(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        insert_credentials_with(&self.pool, record).await
    }

    /// Write a whole catalog file in one transaction: tools are upserted,
    /// credentials appended.
    pub async fn import(&self, catalog: &CatalogFile) -> Result<ImportSummary, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        for doc in &catalog.tools {
            upsert_tool_with(&mut *tx, &doc.name, &doc.configurations).await?;
        }
        for record in &catalog.credentials {
            insert_credentials_with(&mut *tx, record).await?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        let summary = ImportSummary {
            tools: catalog.tools.len(),
            credentials: catalog.credentials.len(),
        };
        debug!(?summary, "Imported catalog");
        Ok(summary)
    }
}

async fn upsert_tool_with<'e, E>(
    executor: E,
    name: &str,
    config: &ToolConfiguration,
) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let document = serde_json::to_string(config).map_err(|e| StoreError::Corrupt {
        key: name.to_string(),
        reason: e.to_string(),
    })?;

    sqlx::query(
        r#"
        INSERT INTO tool_configurations (name, configuration, updated_at)
        VALUES (?, ?, datetime('now'))
        ON CONFLICT(name) DO UPDATE SET
            configuration = excluded.configuration,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(name)
    .bind(document)
    .execute(executor)
    .await
    .map_err(map_sqlx_error)?;

    Ok(())
}

async fn insert_credentials_with<'e, E>(
    executor: E,
    record: &CredentialRecord,
) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT INTO credentials (tool_name, user_id, secrets) VALUES (?, ?, ?)")
        .bind(&record.tool_name)
        .bind(record.user_id.as_deref())
        .bind(encode_secrets(&record.secrets))
        .execute(executor)
        .await
        .map_err(map_sqlx_error)?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal row types for database queries
// ─────────────────────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct ToolRow {
    configuration: String,
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    tool_name: String,
    user_id: Option<String>,
    secrets: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper functions
// ─────────────────────────────────────────────────────────────────────────────

fn encode_secrets(secrets: &Secrets) -> String {
    let encoded: serde_json::Map<String, serde_json::Value> = secrets
        .iter()
        .map(|(name, value)| (name.clone(), STANDARD.encode(value.as_bytes()).into()))
        .collect();
    serde_json::Value::Object(encoded).to_string()
}

fn decode_secrets(key: &str, stored: &str) -> Result<Secrets, StoreError> {
    let corrupt = |reason: String| StoreError::Corrupt {
        key: key.to_string(),
        reason,
    };

    let encoded: BTreeMap<String, String> =
        serde_json::from_str(stored).map_err(|e| corrupt(e.to_string()))?;

    encoded
        .into_iter()
        .map(|(name, value)| {
            let bytes = STANDARD
                .decode(value)
                .map_err(|e| corrupt(format!("secret {name}: {e}")))?;
            let value = String::from_utf8(bytes)
                .map_err(|e| corrupt(format!("secret {name}: {e}")))?;
            Ok((name, value))
        })
        .collect()
}

fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Port implementations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ToolConfigStore for SqliteCatalog {
    async fn find_tool(&self, name: &str) -> Result<Option<ToolConfiguration>, StoreError> {
        let row: Option<ToolRow> =
            sqlx::query_as("SELECT configuration FROM tool_configurations WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row.map(|row| {
            serde_json::from_str(&row.configuration).map_err(|e| StoreError::Corrupt {
                key: name.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
    }
}

#[async_trait]
impl CredentialVault for SqliteCatalog {
    async fn find_credentials(
        &self,
        query: &CredentialQuery,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        let row: Option<CredentialRow> = match &query.user_id {
            Some(user_id) => {
                sqlx::query_as(
                    r#"
                    SELECT tool_name, user_id, secrets FROM credentials
                    WHERE tool_name = ? AND user_id = ?
                    ORDER BY id LIMIT 1
                    "#,
                )
                .bind(&query.tool_name)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT tool_name, user_id, secrets FROM credentials
                    WHERE tool_name = ?
                    ORDER BY id LIMIT 1
                    "#,
                )
                .bind(&query.tool_name)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;

        row.map(|row| {
            let secrets = decode_secrets(&row.tool_name, &row.secrets)?;
            Ok(CredentialRecord::new(row.tool_name, row.user_id, secrets))
        })
        .transpose()
    }
}
