//! Estimate-view telemetry.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EstimateShownRequest {
    pub session_key: String,
}

#[derive(Debug, Serialize)]
pub struct EstimateShownResponse {
    /// `false` when suppressed as a repeat or when the log is unavailable.
    pub recorded: bool,
}

/// Record that the customer saw the estimate for a quote.
pub async fn estimate_shown_api(
    State(state): State<AppState>,
    Path(quote_id): Path<String>,
    Json(req): Json<EstimateShownRequest>,
) -> Result<Json<EstimateShownResponse>> {
    if quote_id.trim().is_empty() {
        return Err(AdminError::BadRequest("quote id is required".to_string()));
    }
    if req.session_key.trim().is_empty() {
        return Err(AdminError::BadRequest("session_key is required".to_string()));
    }

    let recorded = state
        .telemetry
        .record_estimate_shown(&quote_id, &req.session_key)
        .await;
    Ok(Json(EstimateShownResponse { recorded }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support;

    fn request(session_key: &str) -> Json<EstimateShownRequest> {
        Json(EstimateShownRequest {
            session_key: session_key.to_string(),
        })
    }

    #[tokio::test]
    async fn test_second_view_suppressed() {
        let (_db, state) = test_support::state().await;

        let Json(first) = estimate_shown_api(State(state.clone()), Path("q1".to_string()), request("s1"))
            .await
            .unwrap();
        assert!(first.recorded);

        let Json(second) = estimate_shown_api(State(state), Path("q1".to_string()), request("s1"))
            .await
            .unwrap();
        assert!(!second.recorded);
    }

    #[tokio::test]
    async fn test_blank_session_rejected() {
        let (_db, state) = test_support::state().await;
        let result = estimate_shown_api(State(state), Path("q1".to_string()), request("  ")).await;
        assert!(matches!(result, Err(AdminError::BadRequest(_))));
    }
}
