use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::JSend;
use crate::notify;
use crate::storage::models::HistoryEntry;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HistoryEntryResponse {
    pub recipients: Vec<String>,
    pub sequence: u64,
    pub summary: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub history_entries: usize,
    pub registered_users: usize,
    pub status: String,
}

/// Run the dispatcher now, outside the schedule
pub async fn trigger_notify(State(state): State<Arc<AppState>>) -> Json<JSend<HistoryEntryResponse>> {
    tracing::info!("Manual notification dispatch triggered");
    let entry = notify::run_once(&state).await;
    JSend::success(entry_to_response(&entry))
}

pub async fn list_history(State(state): State<Arc<AppState>>) -> Json<JSend<Vec<HistoryEntryResponse>>> {
    JSend::success(state.history.all().iter().map(entry_to_response).collect())
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        history_entries: state.history.len(),
        registered_users: state.registry.len(),
        status: "healthy".to_string(),
    })
}

fn entry_to_response(entry: &HistoryEntry) -> HistoryEntryResponse {
    HistoryEntryResponse {
        recipients: entry.recipients.clone(),
        sequence: entry.sequence,
        summary: entry.summary(),
        timestamp: entry.timestamp.to_rfc3339(),
    }
}
