//! REST API routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::state::{GnssSeries, MonitorState, MonitorStats};
use gnss_core::HistoryEntry;

/// Create the API router.
pub fn create_router() -> Router<Arc<MonitorState>> {
    Router::new()
        .route("/v1/gnss/latest", get(latest_reading))
        .route("/v1/gnss/history", get(history))
        .route("/v1/gnss/series", get(series))
        .route("/v1/gnss/stats", get(stats))
}

/// Current reading, or 204 while waiting for the first sample.
async fn latest_reading(State(state): State<Arc<MonitorState>>) -> Response {
    match state.latest() {
        Some(reading) => Json(reading).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn history(State(state): State<Arc<MonitorState>>) -> Json<Vec<HistoryEntry>> {
    Json(state.history())
}

async fn series(State(state): State<Arc<MonitorState>>) -> Json<GnssSeries> {
    Json(state.series())
}

async fn stats(State(state): State<Arc<MonitorState>>) -> Json<MonitorStats> {
    Json(state.stats())
}
