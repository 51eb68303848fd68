//! Reads and writes against the ops event log.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::ops_event;
use database::{Database, OpsEventRecord};
use ops_core::{
    has_notification_marker, resolve_intro_requests, IntroRequestState, LedgerEvent,
    OpsEventKind, SchemaCapabilityProvider, CHANGE_REQUEST_NOTIFIED, CUSTOMER_INTRO_HANDLED,
    CUSTOMER_INTRO_REQUESTED,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::degrade::WarnOnce;
use crate::error::NotifyError;

const EVENTS_RELATION: &str = "ops_events";
const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "quote_id",
    "destination_id",
    "event_type",
    "payload",
    "created_at",
];

/// Most recent intro events scanned per quote.
const INTRO_EVENTS_PER_QUOTE: i64 = 50;
/// Notification markers scanned per quote before sending.
const NOTIFICATION_MARKER_WINDOW: i64 = 25;

/// Sends change-request notifications. Delivery itself lives elsewhere.
#[async_trait]
pub trait ChangeRequestNotifier: Send + Sync {
    async fn notify_change_request(
        &self,
        quote_id: &str,
        change_request_id: &str,
    ) -> Result<(), NotifyError>;
}

/// What happened to a notification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotifyOutcome {
    /// A marker for this change request was already in the log.
    AlreadyNotified,
    /// Delivered. `marker_recorded` is false if the marker write failed,
    /// in which case a later call may send again.
    Sent { marker_recorded: bool },
    /// The notifier failed; no marker was written.
    Failed { reason: String },
    /// Blank quote or change-request id.
    InvalidInput,
}

/// Event log access with schema gating.
#[derive(Clone)]
pub struct EventLedger {
    database: Database,
    schema: Arc<dyn SchemaCapabilityProvider>,
    warnings: Arc<WarnOnce>,
}

impl EventLedger {
    pub fn new(
        database: Database,
        schema: Arc<dyn SchemaCapabilityProvider>,
        warnings: Arc<WarnOnce>,
    ) -> Self {
        Self {
            database,
            schema,
            warnings,
        }
    }

    async fn available(&self, operation: &str) -> bool {
        let present = self
            .schema
            .has_required_columns(EVENTS_RELATION, REQUIRED_COLUMNS)
            .await;
        if !present {
            self.warnings.missing_schema(EVENTS_RELATION, operation);
        }
        present
    }

    /// Append an event. Returns `false` if nothing was written.
    pub async fn record_event(
        &self,
        quote_id: Option<&str>,
        destination_id: Option<&str>,
        kind: &OpsEventKind,
        created_at: DateTime<Utc>,
    ) -> bool {
        if !self.available("record_event").await {
            return false;
        }

        match ops_event::insert_event(self.database.pool(), quote_id, destination_id, kind, created_at)
            .await
        {
            Ok(id) => {
                debug!(id, event_type = kind.event_type(), "Recorded ops event");
                true
            }
            Err(err) => {
                warn!(
                    relation = EVENTS_RELATION,
                    operation = "record_event",
                    event_type = kind.event_type(),
                    code = %err.code(),
                    error = %err,
                    "Failed to record ops event"
                );
                false
            }
        }
    }

    /// Pending customer intro requests for each quote that has any.
    pub async fn load_intro_requests(&self, quote_ids: &[String]) -> HashMap<String, IntroRequestState> {
        let ids = valid_ids(quote_ids);
        if ids.is_empty() || !self.available("load_intro_requests").await {
            return HashMap::new();
        }

        let records = self.warnings.settle(
            EVENTS_RELATION,
            "load_intro_requests",
            ops_event::list_for_quotes(
                self.database.pool(),
                &ids,
                &[CUSTOMER_INTRO_REQUESTED, CUSTOMER_INTRO_HANDLED],
                INTRO_EVENTS_PER_QUOTE,
            )
            .await,
        );

        resolve_intro_requests(&decode_all(&records))
    }

    /// Send a change-request notification unless the log shows it already went out.
    ///
    /// Check-then-write is not atomic, so two concurrent calls can both send.
    pub async fn maybe_notify_change_request(
        &self,
        quote_id: &str,
        change_request_id: &str,
        notifier: &dyn ChangeRequestNotifier,
    ) -> NotifyOutcome {
        self.maybe_notify_change_request_at(quote_id, change_request_id, notifier, Utc::now())
            .await
    }

    pub async fn maybe_notify_change_request_at(
        &self,
        quote_id: &str,
        change_request_id: &str,
        notifier: &dyn ChangeRequestNotifier,
        now: DateTime<Utc>,
    ) -> NotifyOutcome {
        let quote_id = quote_id.trim();
        let change_request_id = change_request_id.trim();
        if quote_id.is_empty() || change_request_id.is_empty() {
            return NotifyOutcome::InvalidInput;
        }

        let markers = self.recent_markers(quote_id).await;
        if has_notification_marker(&markers, change_request_id) {
            info!(quote_id, change_request_id, "Change request already notified, skipping");
            return NotifyOutcome::AlreadyNotified;
        }

        if let Err(err) = notifier
            .notify_change_request(quote_id, change_request_id)
            .await
        {
            warn!(quote_id, change_request_id, error = %err, "Change request notification failed");
            return NotifyOutcome::Failed {
                reason: err.to_string(),
            };
        }

        let marker = OpsEventKind::ChangeRequestNotified {
            change_request_id: change_request_id.to_string(),
        };
        let marker_recorded = self.record_event(Some(quote_id), None, &marker, now).await;
        info!(quote_id, change_request_id, marker_recorded, "Change request notified");

        NotifyOutcome::Sent { marker_recorded }
    }

    async fn recent_markers(&self, quote_id: &str) -> Vec<LedgerEvent> {
        if !self.available("recent_markers").await {
            return Vec::new();
        }
        let records = self.warnings.settle(
            EVENTS_RELATION,
            "recent_markers",
            ops_event::list_recent(
                self.database.pool(),
                quote_id,
                CHANGE_REQUEST_NOTIFIED,
                NOTIFICATION_MARKER_WINDOW,
            )
            .await,
        );
        decode_all(&records)
    }
}

/// Trimmed, non-blank ids.
pub(crate) fn valid_ids(ids: &[String]) -> Vec<String> {
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn decode_all(records: &[OpsEventRecord]) -> Vec<LedgerEvent> {
    records
        .iter()
        .filter_map(|record| match record.decode() {
            Ok(event) => Some(event),
            Err(err) => {
                debug!(id = record.id, error = %err, "Skipping ops event with invalid payload");
                None
            }
        })
        .collect()
}
