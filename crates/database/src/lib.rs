//! SQLite persistence layer for quote dispatch ops health.
//!
//! This crate provides async reads over quotes, destinations, offers, the
//! customer message thread and the append-only ops event log, plus storage for
//! SLA settings, using SQLx with SQLite.
//!
//! The schema is rolled out incrementally. Queries that touch optional
//! columns take a `*Fields` value, resolved through a
//! [`ops_core::SchemaCapabilityProvider`], and project `NULL` for anything
//! that is not there yet.
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, SqliteSchemaInspector};
//! use database::destination::{self, DestinationFields};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:ops.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Read destinations with whatever optional columns exist
//!     let inspector = SqliteSchemaInspector::new(db.pool().clone());
//!     let fields = DestinationFields::resolve(&inspector).await;
//!     let rows = destination::list_for_quotes(db.pool(), &["q1".to_string()], fields).await?;
//!     println!("{} destinations", rows.len());
//!
//!     Ok(())
//! }
//! ```

pub mod destination;
pub mod error;
pub mod message;
pub mod models;
pub mod offer;
pub mod ops_event;
pub mod quote;
pub mod schema;
pub mod sla_settings;

pub use error::{DatabaseError, Result};
pub use models::{
    format_timestamp, DestinationRecord, MessageReplyRollup, OfferRecord, OpsEventRecord,
    QuoteRecord, SlaSettingsRecord,
};
pub use schema::SqliteSchemaInspector;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Inbox builds issue several independent reads concurrently.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/ops.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// A capability provider backed by this database's live schema.
    pub fn schema_inspector(&self) -> SqliteSchemaInspector {
        SqliteSchemaInspector::new(self.pool.clone())
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Append `(?, ?, ...)` binding every id.
pub(crate) fn push_id_list<'args>(builder: &mut QueryBuilder<'args, Sqlite>, ids: &'args [String]) {
    builder.push("(");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.as_str());
    }
    separated.push_unseparated(")");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ops_core::SchemaCapabilityProvider;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_migrations_create_full_schema() {
        let db = test_db().await;
        let inspector = db.schema_inspector();

        for relation in [
            "quotes",
            "destinations",
            "offers",
            "ops_events",
            "sla_settings",
            "providers",
            "quote_messages",
        ] {
            assert!(
                inspector.has_required_columns(relation, &[]).await,
                "missing {relation}"
            );
        }
    }

    #[tokio::test]
    async fn test_quote_with_destinations_and_offers() {
        let db = test_db().await;
        let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        quote::create_quote(
            db.pool(),
            &quote::NewQuote {
                id: "q1",
                status: "open",
                selected_offer_id: None,
                customer_name: Some("Ada"),
                customer_email: Some("ada@example.com"),
                created_at,
            },
        )
        .await
        .unwrap();
        destination::create_destination(
            db.pool(),
            &destination::NewDestination::new("d1", "q1", "p1", "sent", created_at),
        )
        .await
        .unwrap();
        offer::create_offer(db.pool(), "o1", "q1", "p1", "received", None)
            .await
            .unwrap();

        let ids = vec!["q1".to_string()];
        let destinations =
            destination::list_for_quotes(db.pool(), &ids, destination::DestinationFields::all())
                .await
                .unwrap();
        let offers = offer::list_for_quotes(db.pool(), &ids, offer::OfferFields::all())
            .await
            .unwrap();

        assert_eq!(destinations.len(), 1);
        assert_eq!(offers.len(), 1);
        assert_eq!(destinations[0].snapshot().provider_id, offers[0].snapshot().provider_id);
    }

    #[tokio::test]
    async fn test_destination_requires_existing_quote() {
        let db = test_db().await;
        let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let result = destination::create_destination(
            db.pool(),
            &destination::NewDestination::new("d1", "missing", "p1", "queued", created_at),
        )
        .await;
        assert!(matches!(result, Err(DatabaseError::Sqlx(_))));
    }
}
