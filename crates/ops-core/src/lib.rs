//! SLA evaluation and ops-health aggregation for quote dispatch.
//!
//! A quote is fanned out to many providers ("destinations"). This crate
//! decides, from a snapshot of those destinations and the offers that came
//! back, whether anything about a quote needs staff attention and why.
//!
//! Everything here is pure: no database access, no clocks. Callers pass
//! `now` explicitly so the same inputs always produce the same verdict.
//!
//! - [`evaluate`] - per-destination verdict
//! - [`aggregate`] - per-quote rollup with ranked reasons
//! - [`resolve_intro_requests`] / [`has_notification_marker`] - state derived
//!   from the append-only ops event log
//! - [`SchemaCapabilityProvider`] - the gate consulted before optional reads
//! - [`TelemetryDedupe`] - best-effort suppression of duplicate telemetry
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use ops_core::{evaluate, DestinationSnapshot, DestinationStatus, NeedsActionReason, SlaConfig};
//!
//! let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
//! let destination = DestinationSnapshot::new("d1", "q1", "p1", DestinationStatus::Queued, now - Duration::hours(6));
//!
//! let verdict = evaluate(&destination, now, &SlaConfig::default(), false);
//! assert!(verdict.needs_action);
//! assert_eq!(verdict.reason, Some(NeedsActionReason::QueuedStale));
//! ```

mod aggregate;
mod dedupe;
mod evaluator;
mod events;
mod ledger;
mod schema;
mod sla;
mod status;

pub use aggregate::{aggregate, OfferSnapshot, SlaRollup, MAX_TOP_REASONS};
pub use dedupe::TelemetryDedupe;
pub use evaluator::{evaluate, resolve_reference_time, DestinationSnapshot, Verdict};
pub use events::{
    LedgerEvent, OpsEventKind, PayloadError, CHANGE_REQUEST_NOTIFIED, CUSTOMER_INTRO_HANDLED,
    CUSTOMER_INTRO_REQUESTED, ESTIMATE_SHOWN,
};
pub use ledger::{has_notification_marker, resolve_intro_requests, IntroRequestState};
pub use schema::{SchemaCapabilityProvider, StaticCapabilities};
pub use sla::{LoadedSlaConfig, SlaConfig};
pub use status::{DestinationStatus, NeedsActionReason};

// Re-export async_trait for capability provider implementations
pub use async_trait::async_trait;
