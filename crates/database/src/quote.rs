//! Quote queries.

use chrono::{DateTime, Utc};
use ops_core::SchemaCapabilityProvider;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{format_timestamp, QuoteRecord};
use crate::Result;

/// Optional quote columns available in this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuoteFields {
    /// `customer_name` and `customer_email`.
    pub customer: bool,
}

impl QuoteFields {
    /// Every optional column present.
    pub fn all() -> Self {
        Self { customer: true }
    }

    /// Ask the capability gate which optional columns exist.
    pub async fn resolve(schema: &dyn SchemaCapabilityProvider) -> Self {
        Self {
            customer: schema
                .has_required_columns("quotes", &["customer_name", "customer_email"])
                .await,
        }
    }

    fn projection(&self) -> &'static str {
        if self.customer {
            "customer_name, customer_email"
        } else {
            "NULL AS customer_name, NULL AS customer_email"
        }
    }
}

/// Filters that can be pushed down to the quotes relation.
#[derive(Debug, Clone, Default)]
pub struct QuotePageQuery<'a> {
    pub limit: i64,
    pub offset: i64,
    /// Exact quote status.
    pub status: Option<&'a str>,
    /// Only quotes with a selected offer.
    pub selected_only: bool,
}

/// List a page of quotes, newest first.
pub async fn list_quotes(
    pool: &SqlitePool,
    query: &QuotePageQuery<'_>,
    fields: QuoteFields,
) -> Result<Vec<QuoteRecord>> {
    if query.limit <= 0 || query.offset < 0 {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(format!(
        "SELECT id, status, selected_offer_id, {}, created_at FROM quotes WHERE 1 = 1",
        fields.projection()
    ));
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if query.selected_only {
        builder.push(" AND selected_offer_id IS NOT NULL");
    }
    builder
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(query.limit)
        .push(" OFFSET ")
        .push_bind(query.offset);

    let rows = builder
        .build_query_as::<QuoteRecord>()
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Fields for inserting a quote.
#[derive(Debug, Clone)]
pub struct NewQuote<'a> {
    pub id: &'a str,
    pub status: &'a str,
    pub selected_offer_id: Option<&'a str>,
    pub customer_name: Option<&'a str>,
    pub customer_email: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Insert a quote.
pub async fn create_quote(pool: &SqlitePool, quote: &NewQuote<'_>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO quotes (id, status, selected_offer_id, customer_name, customer_email, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(quote.id)
    .bind(quote.status)
    .bind(quote.selected_offer_id)
    .bind(quote.customer_name)
    .bind(quote.customer_email)
    .bind(format_timestamp(quote.created_at))
    .execute(pool)
    .await?;

    Ok(())
}
