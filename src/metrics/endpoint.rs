use axum::{extract::State, Json};
use std::sync::Arc;

use super::registry::MetricsSnapshot;
use crate::AppState;

// ─── GET /metrics ────────────────────────────────────────────────
/// Per-route hit/error counts and latency statistics as one JSON document.

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
