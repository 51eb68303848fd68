//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use ops_core::{SchemaCapabilityProvider, TelemetryDedupe};
use ops_inbox::{OpsInboxBuilder, SlaConfigProvider, TelemetryRecorder};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Inbox builder, also owning the SLA provider and event ledger.
    pub inbox: OpsInboxBuilder,
    /// Estimate-view telemetry.
    pub telemetry: TelemetryRecorder,
}

impl AppState {
    /// Create new application state backed by the live schema.
    pub fn new(db: Database, dedupe: TelemetryDedupe) -> Self {
        let schema: Arc<dyn SchemaCapabilityProvider> = Arc::new(db.schema_inspector());
        let inbox = OpsInboxBuilder::new(db, schema);
        let telemetry = TelemetryRecorder::new(inbox.ledger().clone(), Arc::new(dedupe));
        Self { inbox, telemetry }
    }

    pub fn sla(&self) -> &SlaConfigProvider {
        self.inbox.sla_config()
    }
}
