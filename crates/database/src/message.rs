//! Customer/staff message thread queries.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{format_timestamp, MessageReplyRollup};
use crate::{push_id_list, Result};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorRole {
    Customer,
    Staff,
}

impl AuthorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorRole::Customer => "customer",
            AuthorRole::Staff => "staff",
        }
    }
}

/// Insert a message.
pub async fn insert_message(
    pool: &SqlitePool,
    quote_id: &str,
    author: AuthorRole,
    body: &str,
    created_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO quote_messages (quote_id, author_role, body, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(quote_id)
    .bind(author.as_str())
    .bind(body)
    .bind(format_timestamp(created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// Reply state per quote. Quotes without messages are absent.
pub async fn list_reply_rollups(
    pool: &SqlitePool,
    quote_ids: &[String],
) -> Result<Vec<MessageReplyRollup>> {
    if quote_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            m.quote_id AS quote_id,
            MAX(CASE WHEN m.author_role = 'customer' THEN m.created_at END) AS last_customer_message_at,
            MAX(CASE WHEN m.author_role = 'staff' THEN m.created_at END) AS last_staff_message_at,
            SUM(CASE
                WHEN m.author_role = 'customer' AND m.created_at > COALESCE(
                    (SELECT MAX(s.created_at) FROM quote_messages s
                     WHERE s.quote_id = m.quote_id AND s.author_role = 'staff'),
                    ''
                ) THEN 1
                ELSE 0
            END) AS unreplied_count
        FROM quote_messages m
        WHERE m.quote_id IN "#,
    );
    push_id_list(&mut builder, quote_ids);
    builder.push(" GROUP BY m.quote_id");

    let rows = builder
        .build_query_as::<MessageReplyRollup>()
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{create_quote, NewQuote};
    use crate::Database;
    use chrono::{Duration, TimeZone};

    fn at(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    #[tokio::test]
    async fn test_reply_rollup() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        for id in ["q1", "q2", "q3"] {
            create_quote(
                db.pool(),
                &NewQuote {
                    id,
                    status: "open",
                    selected_offer_id: None,
                    customer_name: None,
                    customer_email: None,
                    created_at: at(0),
                },
            )
            .await
            .unwrap();
        }

        // q1: customer asked, staff answered, customer followed up twice
        insert_message(db.pool(), "q1", AuthorRole::Customer, "hi", at(1)).await.unwrap();
        insert_message(db.pool(), "q1", AuthorRole::Staff, "hello", at(2)).await.unwrap();
        insert_message(db.pool(), "q1", AuthorRole::Customer, "any news?", at(3)).await.unwrap();
        insert_message(db.pool(), "q1", AuthorRole::Customer, "ping", at(4)).await.unwrap();
        // q2: answered
        insert_message(db.pool(), "q2", AuthorRole::Customer, "hi", at(1)).await.unwrap();
        insert_message(db.pool(), "q2", AuthorRole::Staff, "hello", at(2)).await.unwrap();

        let rows = list_reply_rollups(
            db.pool(),
            &["q1".to_string(), "q2".to_string(), "q3".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(rows.len(), 2);
        let q1 = rows.iter().find(|r| r.quote_id == "q1").unwrap();
        assert_eq!(q1.unreplied_count, 2);
        assert!(q1.needs_reply());
        assert_eq!(q1.last_customer_message_at, Some(at(4)));
        assert_eq!(q1.last_staff_message_at, Some(at(2)));

        let q2 = rows.iter().find(|r| r.quote_id == "q2").unwrap();
        assert!(!q2.needs_reply());
    }
}
