//! Database models.

use chrono::{DateTime, Utc};
use ops_core::{
    DestinationSnapshot, DestinationStatus, LedgerEvent, OfferSnapshot, OpsEventKind,
    PayloadError,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Format a timestamp the way every table stores it.
///
/// Fixed width with millisecond precision, so text ordering matches time
/// ordering.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// One customer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct QuoteRecord {
    pub id: String,
    /// Quote workflow status (e.g., "open", "awarded").
    pub status: String,
    /// Offer the customer picked, if any.
    pub selected_offer_id: Option<String>,
    /// Customer display name; `None` on deployments without the column.
    pub customer_name: Option<String>,
    /// Customer email; `None` on deployments without the column.
    pub customer_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One provider's dispatch record for a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DestinationRecord {
    pub id: String,
    pub quote_id: String,
    pub provider_id: String,
    /// Provider display name from the providers relation, when present.
    pub provider_name: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub last_status_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl DestinationRecord {
    /// The fields SLA evaluation needs.
    pub fn snapshot(&self) -> DestinationSnapshot {
        DestinationSnapshot {
            id: self.id.clone(),
            quote_id: self.quote_id.clone(),
            provider_id: self.provider_id.clone(),
            status: DestinationStatus::parse(&self.status),
            created_at: self.created_at,
            last_status_at: self.last_status_at,
            sent_at: self.sent_at,
            submitted_at: self.submitted_at,
            error_message: self.error_message.clone(),
        }
    }
}

/// A provider's priced response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OfferRecord {
    pub id: String,
    pub quote_id: String,
    pub provider_id: String,
    pub status: String,
    pub received_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OfferRecord {
    pub fn snapshot(&self) -> OfferSnapshot {
        OfferSnapshot {
            id: self.id.clone(),
            quote_id: self.quote_id.clone(),
            provider_id: self.provider_id.clone(),
        }
    }
}

/// A raw ops event row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OpsEventRecord {
    pub id: i64,
    pub quote_id: Option<String>,
    pub destination_id: Option<String>,
    pub event_type: String,
    /// JSON object, shape determined by `event_type`.
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

impl OpsEventRecord {
    /// Validate the payload against its event type.
    pub fn decode(&self) -> Result<LedgerEvent, PayloadError> {
        Ok(LedgerEvent {
            id: self.id,
            quote_id: self.quote_id.clone(),
            destination_id: self.destination_id.clone(),
            kind: OpsEventKind::from_parts(&self.event_type, &self.payload)?,
            created_at: self.created_at,
        })
    }
}

/// A stored SLA settings row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SlaSettingsRecord {
    pub id: i64,
    pub queued_max_hours: i64,
    pub sent_no_reply_max_hours: i64,
    /// `None` on deployments without the column.
    pub error_always_needs_action: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

/// Reply state of one quote's customer/staff message thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MessageReplyRollup {
    pub quote_id: String,
    pub last_customer_message_at: Option<DateTime<Utc>>,
    pub last_staff_message_at: Option<DateTime<Utc>>,
    /// Customer messages newer than the latest staff message.
    pub unreplied_count: i64,
}

impl MessageReplyRollup {
    /// Whether staff owe the customer a reply.
    pub fn needs_reply(&self) -> bool {
        self.unreplied_count > 0
    }
}
