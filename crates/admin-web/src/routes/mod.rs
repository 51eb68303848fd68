//! Route handlers for the admin web interface.

pub mod health;
pub mod inbox;
pub mod sla;
pub mod telemetry;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // API endpoints
        .route("/api/inbox", get(inbox::inbox_api))
        .route("/api/sla", get(sla::get_sla_api).put(sla::put_sla_api))
        .route(
            "/api/quotes/:quote_id/estimate-shown",
            post(telemetry::estimate_shown_api),
        )
}

#[cfg(test)]
pub(crate) mod test_support {
    use database::Database;
    use ops_core::TelemetryDedupe;

    use crate::state::AppState;

    pub async fn state() -> (Database, AppState) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let state = AppState::new(db.clone(), TelemetryDedupe::default());
        (db, state)
    }
}
