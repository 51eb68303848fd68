//! Append-only ops event log.
//!
//! There is no update or delete here: every piece of derived state is
//! recomputed from the sequence of events.

use chrono::{DateTime, Utc};
use ops_core::OpsEventKind;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::DatabaseError;
use crate::models::{format_timestamp, OpsEventRecord};
use crate::{push_id_list, Result};

/// Append an event. The payload is validated against its event type first.
///
/// Returns the new row id.
pub async fn insert_event(
    pool: &SqlitePool,
    quote_id: Option<&str>,
    destination_id: Option<&str>,
    kind: &OpsEventKind,
    created_at: DateTime<Utc>,
) -> Result<i64> {
    let payload = kind.to_payload().map_err(|err| DatabaseError::InvalidData {
        entity: "ops event",
        reason: err.to_string(),
    })?;

    let result = sqlx::query(
        r#"
        INSERT INTO ops_events (quote_id, destination_id, event_type, payload, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(quote_id)
    .bind(destination_id)
    .bind(kind.event_type())
    .bind(payload)
    .bind(format_timestamp(created_at))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Events of the given types for a set of quotes, newest first.
///
/// At most `limit_per_quote` events are returned for each quote, so a busy
/// quote never crowds another out of the window.
pub async fn list_for_quotes(
    pool: &SqlitePool,
    quote_ids: &[String],
    event_types: &[&str],
    limit_per_quote: i64,
) -> Result<Vec<OpsEventRecord>> {
    if quote_ids.is_empty() || event_types.is_empty() || limit_per_quote <= 0 {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, quote_id, destination_id, event_type, payload, created_at FROM ( \
         SELECT id, quote_id, destination_id, event_type, payload, created_at, \
         ROW_NUMBER() OVER (PARTITION BY quote_id ORDER BY created_at DESC, id DESC) AS rn \
         FROM ops_events WHERE quote_id IN ",
    );
    push_id_list(&mut builder, quote_ids);
    builder.push(" AND event_type IN (");
    let mut types = builder.separated(", ");
    for event_type in event_types {
        types.push_bind(*event_type);
    }
    types.push_unseparated(")");
    builder
        .push(") WHERE rn <= ")
        .push_bind(limit_per_quote)
        .push(" ORDER BY created_at DESC, id DESC");

    let rows = builder
        .build_query_as::<OpsEventRecord>()
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// The most recent events of one type for one quote, newest first.
pub async fn list_recent(
    pool: &SqlitePool,
    quote_id: &str,
    event_type: &str,
    limit: i64,
) -> Result<Vec<OpsEventRecord>> {
    let rows = sqlx::query_as::<_, OpsEventRecord>(
        r#"
        SELECT id, quote_id, destination_id, event_type, payload, created_at
        FROM ops_events
        WHERE quote_id = ? AND event_type = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(quote_id)
    .bind(event_type)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
