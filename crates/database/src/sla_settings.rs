//! SLA settings storage.

use sqlx::SqlitePool;

use crate::models::SlaSettingsRecord;
use crate::Result;

/// Get the most recently updated settings row.
///
/// `with_error_flag` selects the `error_always_needs_action` column, which
/// older deployments do not have.
pub async fn get_latest(
    pool: &SqlitePool,
    with_error_flag: bool,
) -> Result<Option<SlaSettingsRecord>> {
    let error_flag = if with_error_flag {
        "error_always_needs_action"
    } else {
        "NULL AS error_always_needs_action"
    };
    let query = format!(
        r#"
        SELECT id, queued_max_hours, sent_no_reply_max_hours, {error_flag}, updated_at
        FROM sla_settings
        ORDER BY updated_at DESC, id DESC
        LIMIT 1
        "#
    );

    let record = sqlx::query_as::<_, SlaSettingsRecord>(&query)
        .fetch_optional(pool)
        .await?;

    Ok(record)
}

/// Write the thresholds to the single logical settings row.
///
/// Updates the latest row if one exists, otherwise inserts one.
pub async fn upsert_thresholds(
    pool: &SqlitePool,
    queued_max_hours: i64,
    sent_no_reply_max_hours: i64,
) -> Result<()> {
    let latest = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id
        FROM sla_settings
        ORDER BY updated_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    match latest {
        Some(id) => {
            sqlx::query(
                r#"
                UPDATE sla_settings
                SET queued_max_hours = ?,
                    sent_no_reply_max_hours = ?,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                WHERE id = ?
                "#,
            )
            .bind(queued_max_hours)
            .bind(sent_no_reply_max_hours)
            .bind(id)
            .execute(pool)
            .await?;
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO sla_settings (queued_max_hours, sent_no_reply_max_hours)
                VALUES (?, ?)
                "#,
            )
            .bind(queued_max_hours)
            .bind(sent_no_reply_max_hours)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}
