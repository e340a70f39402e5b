//! Read-only API for display consumers.

mod routes;

use crate::state::MonitorState;
use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<MonitorState>> {
    routes::create_router()
}
