//! SLA settings API.

use axum::extract::State;
use axum::Json;
use ops_core::LoadedSlaConfig;
use ops_inbox::SaveOutcome;
use serde::Deserialize;
use tracing::info;

use crate::error::{AdminError, Result};
use crate::state::AppState;

/// Request to update the thresholds. Values are rounded to whole hours.
#[derive(Debug, Deserialize)]
pub struct SlaUpdate {
    pub queued_max_hours: f64,
    pub sent_no_reply_max_hours: f64,
}

/// Current thresholds and whether they are the built-in defaults.
pub async fn get_sla_api(State(state): State<AppState>) -> Json<LoadedSlaConfig> {
    Json(state.sla().load_config().await)
}

/// Store new thresholds.
pub async fn put_sla_api(
    State(state): State<AppState>,
    Json(update): Json<SlaUpdate>,
) -> Result<Json<SaveOutcome>> {
    info!(
        queued_max_hours = update.queued_max_hours,
        sent_no_reply_max_hours = update.sent_no_reply_max_hours,
        "SLA settings update requested"
    );

    match state
        .sla()
        .save_config(update.queued_max_hours, update.sent_no_reply_max_hours)
        .await
    {
        outcome @ SaveOutcome::Saved { .. } => Ok(Json(outcome)),
        SaveOutcome::Failed { reason } => Err(AdminError::NotSaved(reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support;

    #[tokio::test]
    async fn test_put_then_get() {
        let (_db, state) = test_support::state().await;

        let Json(initial) = get_sla_api(State(state.clone())).await;
        assert!(initial.using_fallback);

        let Json(outcome) = put_sla_api(
            State(state.clone()),
            Json(SlaUpdate {
                queued_max_hours: 2.4,
                sent_no_reply_max_hours: 36.0,
            }),
        )
        .await
        .unwrap();
        assert!(outcome.is_saved());

        let Json(loaded) = get_sla_api(State(state)).await;
        assert!(!loaded.using_fallback);
        assert_eq!(loaded.config.queued_max_hours, 2);
        assert_eq!(loaded.config.sent_no_reply_max_hours, 36);
    }

    #[tokio::test]
    async fn test_negative_threshold_rejected() {
        let (_db, state) = test_support::state().await;
        let result = put_sla_api(
            State(state),
            Json(SlaUpdate {
                queued_max_hours: -1.0,
                sent_no_reply_max_hours: 48.0,
            }),
        )
        .await;
        assert!(matches!(result, Err(AdminError::NotSaved(_))));
    }
}
