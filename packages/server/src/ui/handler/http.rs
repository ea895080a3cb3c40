//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::{
        http::{HistoryDto, SessionSummaryDto},
        websocket::RelayEventDto,
    },
    ui::state::AppState,
};
use liverelay_shared::time::timestamp_to_jst_rfc3339;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current session: room, state, viewer count and buffered events
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionSummaryDto> {
    let summary = state.supervisor.session_summary().await;
    Json(summary.into())
}

/// Debug endpoint returning the replay buffer (for testing purposes)
pub async fn debug_history(State(state): State<Arc<AppState>>) -> Json<HistoryDto> {
    let history = state.supervisor.history().await;

    let oldest = history
        .iter()
        .find_map(|event| event.timestamp())
        .map(|ts| timestamp_to_jst_rfc3339(ts.value()));
    let newest = history
        .iter()
        .rev()
        .find_map(|event| event.timestamp())
        .map(|ts| timestamp_to_jst_rfc3339(ts.value()));

    // Domain Model から DTO への変換
    let events = history.into_iter().map(RelayEventDto::from).collect();

    Json(HistoryDto {
        events,
        oldest,
        newest,
    })
}
