//! Per-destination SLA verdicts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::sla::SlaConfig;
use crate::status::{DestinationStatus, NeedsActionReason};

/// The fields of a destination that SLA evaluation looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationSnapshot {
    pub id: String,
    pub quote_id: String,
    pub provider_id: String,
    pub status: DestinationStatus,
    pub created_at: DateTime<Utc>,
    pub last_status_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl DestinationSnapshot {
    /// Create a snapshot with no optional timestamps.
    pub fn new(
        id: impl Into<String>,
        quote_id: impl Into<String>,
        provider_id: impl Into<String>,
        status: DestinationStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            quote_id: quote_id.into(),
            provider_id: provider_id.into(),
            status,
            created_at,
            last_status_at: None,
            sent_at: None,
            submitted_at: None,
            error_message: None,
        }
    }

    pub fn with_sent_at(mut self, sent_at: DateTime<Utc>) -> Self {
        self.sent_at = Some(sent_at);
        self
    }

    pub fn with_last_status_at(mut self, last_status_at: DateTime<Utc>) -> Self {
        self.last_status_at = Some(last_status_at);
        self
    }

    /// The timestamp "no reply" age is measured from.
    ///
    /// `sent_at`, then `last_status_at`, then `created_at`.
    pub fn reply_reference_time(&self) -> DateTime<Utc> {
        resolve_reference_time(&[self.sent_at, self.last_status_at])
            .unwrap_or(self.created_at)
    }
}

/// Pick the first present timestamp from an ordered list of candidates.
pub fn resolve_reference_time(candidates: &[Option<DateTime<Utc>>]) -> Option<DateTime<Utc>> {
    candidates.iter().find_map(|candidate| *candidate)
}

/// Whether a destination needs staff attention, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Verdict {
    pub needs_action: bool,
    pub reason: Option<NeedsActionReason>,
}

impl Verdict {
    fn clear() -> Self {
        Self::default()
    }

    fn flagged_if(condition: bool, reason: NeedsActionReason) -> Self {
        if condition {
            Self {
                needs_action: true,
                reason: Some(reason),
            }
        } else {
            Self::clear()
        }
    }
}

/// Evaluate one destination against the SLA thresholds.
///
/// Rules, first match wins:
///
/// 1. An offer from the destination's provider closes it out.
/// 2. `error` needs action iff `error_always_needs_action`.
/// 3. `queued` needs action once older than `queued_max_hours`.
/// 4. `sent`, `submitted` and `viewed` need action once the reply reference
///    time is older than `sent_no_reply_max_hours`.
/// 5. Everything else (`quoted`, `declined`, unknown statuses) is clear.
pub fn evaluate(
    destination: &DestinationSnapshot,
    now: DateTime<Utc>,
    config: &SlaConfig,
    has_offer: bool,
) -> Verdict {
    if has_offer {
        return Verdict::clear();
    }

    match &destination.status {
        DestinationStatus::Error => {
            Verdict::flagged_if(config.error_always_needs_action, NeedsActionReason::Error)
        }
        DestinationStatus::Queued => Verdict::flagged_if(
            older_than(destination.created_at, now, config.queued_max_hours),
            NeedsActionReason::QueuedStale,
        ),
        status if status.awaits_reply() => Verdict::flagged_if(
            older_than(
                destination.reply_reference_time(),
                now,
                config.sent_no_reply_max_hours,
            ),
            NeedsActionReason::NoReply,
        ),
        _ => Verdict::clear(),
    }
}

fn older_than(since: DateTime<Utc>, now: DateTime<Utc>, max_hours: u32) -> bool {
    now.signed_duration_since(since) > Duration::hours(i64::from(max_hours))
}
