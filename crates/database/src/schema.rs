//! Live schema introspection.

use std::collections::HashSet;

use async_trait::async_trait;
use ops_core::SchemaCapabilityProvider;
use sqlx::SqlitePool;
use tracing::debug;

use crate::Result;

/// Answers capability checks by asking SQLite for a relation's columns.
///
/// Every call hits `pragma_table_info`, so a migration applied while the
/// process runs is picked up on the next check.
#[derive(Debug, Clone)]
pub struct SqliteSchemaInspector {
    pool: SqlitePool,
}

impl SqliteSchemaInspector {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Column names of `relation`. Empty when the relation does not exist.
    pub async fn columns(&self, relation: &str) -> Result<HashSet<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT name
            FROM pragma_table_info(?)
            "#,
        )
        .bind(relation)
        .fetch_all(&self.pool)
        .await?;

        Ok(names.into_iter().collect())
    }
}

#[async_trait]
impl SchemaCapabilityProvider for SqliteSchemaInspector {
    async fn has_required_columns(&self, relation: &str, columns: &[&str]) -> bool {
        match self.columns(relation).await {
            Ok(known) => !known.is_empty() && columns.iter().all(|c| known.contains(*c)),
            Err(err) => {
                debug!(relation, error = %err, "Schema introspection failed");
                false
            }
        }
    }
}
