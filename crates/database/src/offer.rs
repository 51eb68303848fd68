//! Offer queries.

use chrono::{DateTime, Utc};
use ops_core::SchemaCapabilityProvider;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{format_timestamp, OfferRecord};
use crate::{push_id_list, Result};

/// Optional offer columns available in this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OfferFields {
    pub received_at: bool,
}

impl OfferFields {
    pub fn all() -> Self {
        Self { received_at: true }
    }

    /// Ask the capability gate which optional columns exist.
    pub async fn resolve(schema: &dyn SchemaCapabilityProvider) -> Self {
        Self {
            received_at: schema.has_required_columns("offers", &["received_at"]).await,
        }
    }
}

/// List offers for a set of quotes, most recently received first.
pub async fn list_for_quotes(
    pool: &SqlitePool,
    quote_ids: &[String],
    fields: OfferFields,
) -> Result<Vec<OfferRecord>> {
    if quote_ids.is_empty() {
        return Ok(Vec::new());
    }

    let (received_at, order) = if fields.received_at {
        ("received_at", "COALESCE(received_at, created_at)")
    } else {
        ("NULL AS received_at", "created_at")
    };
    let mut builder = QueryBuilder::<Sqlite>::new(format!(
        "SELECT id, quote_id, provider_id, status, {received_at}, created_at FROM offers WHERE quote_id IN "
    ));
    push_id_list(&mut builder, quote_ids);
    builder.push(format!(" ORDER BY quote_id, {order} DESC, id ASC"));

    let rows = builder
        .build_query_as::<OfferRecord>()
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Insert an offer.
pub async fn create_offer(
    pool: &SqlitePool,
    id: &str,
    quote_id: &str,
    provider_id: &str,
    status: &str,
    received_at: Option<DateTime<Utc>>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO offers (id, quote_id, provider_id, status, received_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(quote_id)
    .bind(provider_id)
    .bind(status)
    .bind(received_at.map(format_timestamp))
    .execute(pool)
    .await?;

    Ok(())
}
