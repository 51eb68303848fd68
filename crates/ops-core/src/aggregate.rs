//! Per-quote SLA rollup.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluator::{evaluate, DestinationSnapshot};
use crate::sla::SlaConfig;
use crate::status::NeedsActionReason;

/// Maximum number of reasons reported in [`SlaRollup::top_reasons`].
pub const MAX_TOP_REASONS: usize = 2;

/// The part of an offer the rollup cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferSnapshot {
    pub id: String,
    pub quote_id: String,
    pub provider_id: String,
}

/// SLA counts for one quote.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlaRollup {
    /// Destinations per status name.
    pub counts: BTreeMap<String, u32>,
    pub needs_action_count: u32,
    pub needs_reply_count: u32,
    pub errors_count: u32,
    pub queued_stale_count: u32,
    /// Most frequent reasons first, ties broken alphabetically.
    pub top_reasons: Vec<NeedsActionReason>,
}

/// Fold every destination of a quote through [`evaluate`].
///
/// A destination counts as replied when any offer shares its provider id.
/// The result does not depend on the order of `destinations`.
pub fn aggregate(
    destinations: &[DestinationSnapshot],
    offers: &[OfferSnapshot],
    now: DateTime<Utc>,
    config: &SlaConfig,
) -> SlaRollup {
    let offer_providers: HashSet<&str> = offers.iter().map(|o| o.provider_id.as_str()).collect();

    let mut rollup = SlaRollup::default();
    let mut reason_counts: HashMap<NeedsActionReason, u32> = HashMap::new();

    for destination in destinations {
        *rollup
            .counts
            .entry(destination.status.as_str().to_string())
            .or_insert(0) += 1;

        let has_offer = offer_providers.contains(destination.provider_id.as_str());
        let verdict = evaluate(destination, now, config, has_offer);
        if !verdict.needs_action {
            continue;
        }

        rollup.needs_action_count += 1;
        if let Some(reason) = verdict.reason {
            match reason {
                NeedsActionReason::QueuedStale => rollup.queued_stale_count += 1,
                NeedsActionReason::NoReply => rollup.needs_reply_count += 1,
                NeedsActionReason::Error => rollup.errors_count += 1,
            }
            *reason_counts.entry(reason).or_insert(0) += 1;
        }
    }

    rollup.top_reasons = rank_reasons(reason_counts);
    rollup
}

fn rank_reasons(counts: HashMap<NeedsActionReason, u32>) -> Vec<NeedsActionReason> {
    let mut ranked: Vec<(NeedsActionReason, u32)> = counts.into_iter().collect();
    ranked.sort_by(|(a_reason, a_count), (b_reason, b_count)| {
        b_count
            .cmp(a_count)
            .then_with(|| a_reason.as_str().cmp(b_reason.as_str()))
    });
    ranked
        .into_iter()
        .take(MAX_TOP_REASONS)
        .map(|(reason, _)| reason)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::DestinationStatus;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn destination(id: &str, provider: &str, status: DestinationStatus, age: i64) -> DestinationSnapshot {
        DestinationSnapshot::new(id, "q1", provider, status, now() - Duration::hours(age))
    }

    fn offer(provider: &str) -> OfferSnapshot {
        OfferSnapshot {
            id: format!("o-{provider}"),
            quote_id: "q1".to_string(),
            provider_id: provider.to_string(),
        }
    }

    #[test]
    fn test_counts_and_reasons() {
        let destinations = vec![
            destination("d1", "p1", DestinationStatus::Queued, 10),
            destination("d2", "p2", DestinationStatus::Sent, 100),
            destination("d3", "p3", DestinationStatus::Sent, 100),
            destination("d4", "p4", DestinationStatus::Error, 1),
            destination("d5", "p5", DestinationStatus::Quoted, 1),
        ];

        let rollup = aggregate(&destinations, &[offer("p3")], now(), &SlaConfig::default());

        assert_eq!(rollup.counts.get("sent"), Some(&2));
        assert_eq!(rollup.counts.get("quoted"), Some(&1));
        assert_eq!(rollup.needs_action_count, 3);
        assert_eq!(rollup.queued_stale_count, 1);
        assert_eq!(rollup.needs_reply_count, 1);
        assert_eq!(rollup.errors_count, 1);
    }

    #[test]
    fn test_order_independent() {
        let mut destinations = vec![
            destination("d1", "p1", DestinationStatus::Queued, 10),
            destination("d2", "p2", DestinationStatus::Viewed, 60),
            destination("d3", "p3", DestinationStatus::Error, 1),
            destination("d4", "p4", DestinationStatus::Declined, 1),
        ];
        let forward = aggregate(&destinations, &[], now(), &SlaConfig::default());
        destinations.reverse();
        let backward = aggregate(&destinations, &[], now(), &SlaConfig::default());
        destinations.swap(0, 2);
        let shuffled = aggregate(&destinations, &[], now(), &SlaConfig::default());

        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_top_reasons_tie_break_alphabetical() {
        let destinations = vec![
            destination("d1", "p1", DestinationStatus::Queued, 10),
            destination("d2", "p2", DestinationStatus::Sent, 100),
            destination("d3", "p3", DestinationStatus::Error, 1),
        ];
        let rollup = aggregate(&destinations, &[], now(), &SlaConfig::default());

        assert_eq!(
            rollup.top_reasons,
            vec![NeedsActionReason::Error, NeedsActionReason::NoReply]
        );
    }

    #[test]
    fn test_top_reasons_by_frequency() {
        let destinations = vec![
            destination("d1", "p1", DestinationStatus::Queued, 10),
            destination("d2", "p2", DestinationStatus::Queued, 10),
            destination("d3", "p3", DestinationStatus::Queued, 10),
            destination("d4", "p4", DestinationStatus::Sent, 100),
            destination("d5", "p5", DestinationStatus::Sent, 100),
            destination("d6", "p6", DestinationStatus::Error, 1),
        ];
        let rollup = aggregate(&destinations, &[], now(), &SlaConfig::default());

        assert_eq!(rollup.top_reasons.len(), MAX_TOP_REASONS);
        assert_eq!(
            rollup.top_reasons,
            vec![NeedsActionReason::QueuedStale, NeedsActionReason::NoReply]
        );
    }

    #[test]
    fn test_empty_quote() {
        let rollup = aggregate(&[], &[], now(), &SlaConfig::default());
        assert_eq!(rollup, SlaRollup::default());
    }
}
