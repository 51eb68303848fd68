//! Ops inbox orchestration for quote dispatch.
//!
//! This crate wires the pure rules in `ops_core` to the `database` crate and
//! provides the [`OpsInboxBuilder`], which turns a page of quotes into
//! per-quote health rows for staff.
//!
//! # Features
//!
//! - SLA thresholds loaded from storage with a hard-coded fallback
//! - Pending customer intro requests derived from the ops event log
//! - Idempotent change-request notification keyed on log markers
//! - Estimate-view telemetry with best-effort duplicate suppression
//! - Every optional read gated on the schema, degrading to empty results
//!
//! # Architecture
//!
//! ```text
//! InboxQuery (filters, paging)
//!          ↓
//! ┌──────────────────────────────────────────────────────┐
//! │                  OPS INBOX BUILDER                   │
//! │                                                      │
//! │  1. Page quotes (status / selected pushed down)      │
//! │         ↓                                            │
//! │  2. Batch-load concurrently:                         │
//! │     • destinations (+ provider names)                │
//! │     • offers                                         │
//! │     • message reply rollups                          │
//! │     • pending intro requests (event ledger)          │
//! │         ↓                                            │
//! │  3. Evaluate and aggregate per quote                 │
//! │         ↓                                            │
//! │  4. Post-filter, keeping quote order                 │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Public entry points never return errors. A missing relation or column is
//! logged once and treated as "no data"; other read failures are logged and
//! degrade the same way.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use database::Database;
//! use ops_inbox::{InboxFilters, InboxQuery, OpsInboxBuilder};
//!
//! let db = Database::connect("sqlite:ops.db?mode=rwc").await?;
//! let builder = OpsInboxBuilder::new(db.clone(), Arc::new(db.schema_inspector()));
//!
//! let query = InboxQuery {
//!     filters: InboxFilters { needs_action_only: true, ..Default::default() },
//!     ..Default::default()
//! };
//! for row in builder.build(&query, None).await {
//!     println!("{}: {} need action", row.quote.id, row.summary.needs_action_count);
//! }
//! ```

pub mod degrade;
pub mod error;
pub mod inbox;
pub mod ledger;
pub mod sla_config;
pub mod telemetry;

pub use degrade::WarnOnce;
pub use error::NotifyError;
pub use inbox::{
    DestinationHealth, InboxFilters, InboxQuery, OpsInboxBuilder, QuoteHealthRow,
    QuoteHealthSummary, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use ledger::{ChangeRequestNotifier, EventLedger, NotifyOutcome};
pub use sla_config::{SaveOutcome, SlaConfigProvider};
pub use telemetry::TelemetryRecorder;

// Re-export async_trait for notifier implementations
pub use async_trait::async_trait;
