//! Destination queries.

use chrono::{DateTime, Utc};
use ops_core::SchemaCapabilityProvider;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{format_timestamp, DestinationRecord};
use crate::{push_id_list, Result};

/// Optional destination columns available in this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DestinationFields {
    pub last_status_at: bool,
    pub sent_at: bool,
    pub submitted_at: bool,
    pub error_message: bool,
    /// Provider name via the providers relation.
    pub provider_name: bool,
}

impl DestinationFields {
    /// Every optional column present.
    pub fn all() -> Self {
        Self {
            last_status_at: true,
            sent_at: true,
            submitted_at: true,
            error_message: true,
            provider_name: true,
        }
    }

    /// Ask the capability gate which optional columns exist.
    pub async fn resolve(schema: &dyn SchemaCapabilityProvider) -> Self {
        Self {
            last_status_at: schema
                .has_required_columns("destinations", &["last_status_at"])
                .await,
            sent_at: schema.has_required_columns("destinations", &["sent_at"]).await,
            submitted_at: schema
                .has_required_columns("destinations", &["submitted_at"])
                .await,
            error_message: schema
                .has_required_columns("destinations", &["error_message"])
                .await,
            provider_name: schema.has_required_columns("providers", &["id", "name"]).await,
        }
    }

    fn projection(&self) -> String {
        let optional = |present: bool, column: &str| {
            if present {
                format!("d.{column} AS {column}")
            } else {
                format!("NULL AS {column}")
            }
        };
        let provider_name = if self.provider_name {
            "p.name AS provider_name".to_string()
        } else {
            "NULL AS provider_name".to_string()
        };

        [
            "d.id AS id".to_string(),
            "d.quote_id AS quote_id".to_string(),
            "d.provider_id AS provider_id".to_string(),
            provider_name,
            "d.status AS status".to_string(),
            "d.created_at AS created_at".to_string(),
            optional(self.last_status_at, "last_status_at"),
            optional(self.sent_at, "sent_at"),
            optional(self.submitted_at, "submitted_at"),
            optional(self.error_message, "error_message"),
        ]
        .join(", ")
    }
}

/// List destinations for a set of quotes, oldest first within each quote.
pub async fn list_for_quotes(
    pool: &SqlitePool,
    quote_ids: &[String],
    fields: DestinationFields,
) -> Result<Vec<DestinationRecord>> {
    if quote_ids.is_empty() {
        return Ok(Vec::new());
    }

    let join = if fields.provider_name {
        " LEFT JOIN providers p ON p.id = d.provider_id"
    } else {
        ""
    };
    let mut builder = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM destinations d{} WHERE d.quote_id IN ",
        fields.projection(),
        join
    ));
    push_id_list(&mut builder, quote_ids);
    builder.push(" ORDER BY d.quote_id, d.created_at ASC, d.id ASC");

    let rows = builder
        .build_query_as::<DestinationRecord>()
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Fields for inserting a destination.
#[derive(Debug, Clone)]
pub struct NewDestination<'a> {
    pub id: &'a str,
    pub quote_id: &'a str,
    pub provider_id: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub last_status_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub error_message: Option<&'a str>,
}

impl<'a> NewDestination<'a> {
    /// A destination with no optional timestamps.
    pub fn new(
        id: &'a str,
        quote_id: &'a str,
        provider_id: &'a str,
        status: &'a str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            quote_id,
            provider_id,
            status,
            created_at,
            last_status_at: None,
            sent_at: None,
            submitted_at: None,
            error_message: None,
        }
    }
}

/// Insert a destination.
pub async fn create_destination(pool: &SqlitePool, destination: &NewDestination<'_>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO destinations (
            id, quote_id, provider_id, status, created_at,
            last_status_at, sent_at, submitted_at, error_message
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(destination.id)
    .bind(destination.quote_id)
    .bind(destination.provider_id)
    .bind(destination.status)
    .bind(format_timestamp(destination.created_at))
    .bind(destination.last_status_at.map(format_timestamp))
    .bind(destination.sent_at.map(format_timestamp))
    .bind(destination.submitted_at.map(format_timestamp))
    .bind(destination.error_message)
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert or rename a provider.
pub async fn upsert_provider(pool: &SqlitePool, id: &str, name: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO providers (id, name)
        VALUES (?, ?)
        ON CONFLICT(id) DO UPDATE SET name = excluded.name
        "#,
    )
    .bind(id)
    .bind(name)
    .execute(pool)
    .await?;

    Ok(())
}
