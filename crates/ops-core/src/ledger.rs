//! State derived from the ops event log.
//!
//! The log is append-only, so "is this still pending" and "did we already
//! do this" are answered by folding over events rather than reading flags.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{LedgerEvent, OpsEventKind};

/// Pending customer intro requests for one quote.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntroRequestState {
    /// Number of providers with a pending request.
    pub intro_requests_count: u32,
    /// Providers with a pending request, sorted.
    pub provider_ids: Vec<String>,
    /// Most recent pending request time.
    pub last_requested_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct IntroKey {
    requested_at: Option<DateTime<Utc>>,
    handled_at: Option<DateTime<Utc>>,
}

impl IntroKey {
    fn pending_since(&self) -> Option<DateTime<Utc>> {
        let requested = self.requested_at?;
        match self.handled_at {
            Some(handled) if handled >= requested => None,
            _ => Some(requested),
        }
    }
}

fn keep_latest(slot: &mut Option<DateTime<Utc>>, at: DateTime<Utc>) {
    if slot.map_or(true, |current| at > current) {
        *slot = Some(at);
    }
}

/// Fold intro request/handled events into per-quote pending state.
///
/// A `(quote, provider)` pair is pending when its latest request is newer than
/// its latest handled event, or it was never handled. Only quotes with at least
/// one pending provider appear in the result. Event order does not matter.
pub fn resolve_intro_requests(events: &[LedgerEvent]) -> HashMap<String, IntroRequestState> {
    let mut keys: HashMap<(&str, &str), IntroKey> = HashMap::new();

    for event in events {
        let Some(quote_id) = event.quote_id.as_deref() else {
            continue;
        };
        match &event.kind {
            OpsEventKind::CustomerIntroRequested { provider_id, .. } => {
                let key = keys.entry((quote_id, provider_id.as_str())).or_default();
                keep_latest(&mut key.requested_at, event.created_at);
            }
            OpsEventKind::CustomerIntroHandled { provider_id } => {
                let key = keys.entry((quote_id, provider_id.as_str())).or_default();
                keep_latest(&mut key.handled_at, event.created_at);
            }
            _ => {}
        }
    }

    let mut pending: HashMap<&str, (BTreeSet<&str>, Option<DateTime<Utc>>)> = HashMap::new();
    for ((quote_id, provider_id), key) in &keys {
        if let Some(requested_at) = key.pending_since() {
            let (providers, last) = pending.entry(*quote_id).or_default();
            providers.insert(*provider_id);
            keep_latest(last, requested_at);
        }
    }

    pending
        .into_iter()
        .map(|(quote_id, (providers, last_requested_at))| {
            let state = IntroRequestState {
                intro_requests_count: providers.len() as u32,
                provider_ids: providers.into_iter().map(str::to_string).collect(),
                last_requested_at,
            };
            (quote_id.to_string(), state)
        })
        .collect()
}

/// Whether a change-request notification marker for `change_request_id` is
/// among `markers`.
pub fn has_notification_marker(markers: &[LedgerEvent], change_request_id: &str) -> bool {
    markers.iter().any(|event| {
        matches!(
            &event.kind,
            OpsEventKind::ChangeRequestNotified { change_request_id: id } if id == change_request_id
        )
    })
}
