//! SLA settings with a hard-coded fallback.

use std::sync::Arc;

use database::sla_settings;
use database::{Database, SlaSettingsRecord};
use ops_core::{LoadedSlaConfig, SchemaCapabilityProvider, SlaConfig};
use serde::Serialize;
use tracing::{info, warn};

use crate::degrade::WarnOnce;

const SETTINGS_RELATION: &str = "sla_settings";
const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "queued_max_hours",
    "sent_no_reply_max_hours",
    "updated_at",
];

/// Result of saving thresholds. Failures are reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Stored, after rounding to whole hours.
    Saved {
        queued_max_hours: u32,
        sent_no_reply_max_hours: u32,
    },
    /// Nothing was stored.
    Failed { reason: String },
}

impl SaveOutcome {
    fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Loads and saves SLA thresholds.
#[derive(Clone)]
pub struct SlaConfigProvider {
    database: Database,
    schema: Arc<dyn SchemaCapabilityProvider>,
    warnings: Arc<WarnOnce>,
}

impl SlaConfigProvider {
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

    /// Load the current thresholds.
    ///
    /// A missing relation, an empty table, an out-of-range row or any read
    /// error yields the defaults with `using_fallback` set.
    pub async fn load_config(&self) -> LoadedSlaConfig {
        if !self
            .schema
            .has_required_columns(SETTINGS_RELATION, REQUIRED_COLUMNS)
            .await
        {
            self.warnings.missing_schema(SETTINGS_RELATION, "load_config");
            return LoadedSlaConfig::fallback();
        }

        let with_error_flag = self
            .schema
            .has_required_columns(SETTINGS_RELATION, &["error_always_needs_action"])
            .await;

        let record = self.warnings.settle(
            SETTINGS_RELATION,
            "load_config",
            sla_settings::get_latest(self.database.pool(), with_error_flag).await,
        );

        match record {
            Some(record) => match config_from_record(&record) {
                Some(config) => LoadedSlaConfig::stored(config),
                None => {
                    warn!(id = record.id, "SLA settings row out of range, using defaults");
                    LoadedSlaConfig::fallback()
                }
            },
            None => LoadedSlaConfig::fallback(),
        }
    }

    /// Store new thresholds, rounded to the nearest whole hour.
    pub async fn save_config(&self, queued_max_hours: f64, sent_no_reply_max_hours: f64) -> SaveOutcome {
        let Some(queued) = round_hours(queued_max_hours) else {
            return SaveOutcome::failed("queued_max_hours must be a non-negative number");
        };
        let Some(sent) = round_hours(sent_no_reply_max_hours) else {
            return SaveOutcome::failed("sent_no_reply_max_hours must be a non-negative number");
        };

        if !self
            .schema
            .has_required_columns(SETTINGS_RELATION, REQUIRED_COLUMNS)
            .await
        {
            self.warnings.missing_schema(SETTINGS_RELATION, "save_config");
            return SaveOutcome::failed("SLA settings storage is not available");
        }

        match sla_settings::upsert_thresholds(self.database.pool(), i64::from(queued), i64::from(sent))
            .await
        {
            Ok(()) => {
                info!(
                    queued_max_hours = queued,
                    sent_no_reply_max_hours = sent,
                    "SLA settings saved"
                );
                SaveOutcome::Saved {
                    queued_max_hours: queued,
                    sent_no_reply_max_hours: sent,
                }
            }
            Err(err) => {
                warn!(
                    relation = SETTINGS_RELATION,
                    operation = "save_config",
                    code = %err.code(),
                    error = %err,
                    "Failed to save SLA settings"
                );
                SaveOutcome::failed(format!("failed to save SLA settings: {}", err.code()))
            }
        }
    }
}

fn round_hours(hours: f64) -> Option<u32> {
    if !hours.is_finite() {
        return None;
    }
    let rounded = hours.round();
    if rounded < 0.0 || rounded > f64::from(u32::MAX) {
        return None;
    }
    Some(rounded as u32)
}

fn config_from_record(record: &SlaSettingsRecord) -> Option<SlaConfig> {
    Some(SlaConfig {
        queued_max_hours: u32::try_from(record.queued_max_hours).ok()?,
        sent_no_reply_max_hours: u32::try_from(record.sent_no_reply_max_hours).ok()?,
        error_always_needs_action: record
            .error_always_needs_action
            .unwrap_or(SlaConfig::default().error_always_needs_action),
    })
}
