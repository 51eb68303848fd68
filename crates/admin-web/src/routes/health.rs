//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
    /// Whether SLA evaluation is running on the built-in defaults.
    pub sla_using_fallback: bool,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let loaded = state.sla().load_config().await;
    Json(Health {
        status: "ok".to_string(),
        sla_using_fallback: loaded.using_fallback,
    })
}
