//! Ops inbox API.

use axum::extract::{Query, State};
use axum::Json;
use ops_inbox::{InboxFilters, InboxQuery, QuoteHealthRow};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Query string for the inbox. Flat so numbers and flags parse from
/// urlencoded values.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InboxParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<String>,
    pub needs_action_only: bool,
    pub message_needs_reply_only: bool,
    pub intro_requested_only: bool,
    pub provider_id: Option<String>,
    pub destination_status: Option<String>,
    pub selected_only: bool,
}

impl From<InboxParams> for InboxQuery {
    fn from(params: InboxParams) -> Self {
        InboxQuery {
            limit: params.limit,
            offset: params.offset,
            filters: InboxFilters {
                status: params.status,
                needs_action_only: params.needs_action_only,
                message_needs_reply_only: params.message_needs_reply_only,
                intro_requested_only: params.intro_requested_only,
                provider_id: params.provider_id,
                destination_status: params.destination_status,
                selected_only: params.selected_only,
            },
        }
    }
}

/// Inbox page.
#[derive(Serialize)]
pub struct InboxResponse {
    pub count: usize,
    pub rows: Vec<QuoteHealthRow>,
}

/// List inbox rows, newest quote first.
pub async fn inbox_api(
    State(state): State<AppState>,
    Query(params): Query<InboxParams>,
) -> Json<InboxResponse> {
    let rows = state.inbox.build(&params.into(), None).await;
    Json(InboxResponse {
        count: rows.len(),
        rows,
    })
}
