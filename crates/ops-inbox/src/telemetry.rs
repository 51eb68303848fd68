//! Low-value telemetry written to the ops event log.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ops_core::{OpsEventKind, TelemetryDedupe};
use tracing::debug;

use crate::ledger::EventLedger;

/// Records telemetry events, suppressing repeats through a shared cache.
#[derive(Clone)]
pub struct TelemetryRecorder {
    ledger: EventLedger,
    dedupe: Arc<TelemetryDedupe>,
}

impl TelemetryRecorder {
    pub fn new(ledger: EventLedger, dedupe: Arc<TelemetryDedupe>) -> Self {
        Self { ledger, dedupe }
    }

    /// Record that a customer saw the estimate for a quote.
    ///
    /// Returns `true` if an event was written.
    pub async fn record_estimate_shown(&self, quote_id: &str, session_key: &str) -> bool {
        self.record_estimate_shown_at(quote_id, session_key, Utc::now())
            .await
    }

    pub async fn record_estimate_shown_at(
        &self,
        quote_id: &str,
        session_key: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let quote_id = quote_id.trim();
        let session_key = session_key.trim();
        if quote_id.is_empty() || session_key.is_empty() {
            return false;
        }

        let key = format!("{session_key}:{quote_id}");
        if !self.dedupe.first_sighting(&key, now).await {
            debug!(quote_id, "Estimate view already recorded for session");
            return false;
        }

        let kind = OpsEventKind::EstimateShown {
            session_key: session_key.to_string(),
        };
        self.ledger.record_event(Some(quote_id), None, &kind, now).await
    }
}
