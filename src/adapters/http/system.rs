//! Liveness and status endpoints.
//!
//! - `GET /v1/ping` - `"pong"`
//! - `GET /v1/status` - uptime and live connection counts

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::adapters::websocket::RealtimeHub;
use crate::domain::realtime::{AgentEvent, DashboardEvent};

#[derive(Clone)]
pub struct SystemAppState {
    pub agents: Arc<RealtimeHub<AgentEvent>>,
    pub dashboards: Arc<RealtimeHub<DashboardEvent>>,
    pub started_at: Instant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub uptime_secs: u64,
    pub reporters: usize,
    pub clients: usize,
}

pub async fn ping() -> &'static str {
    "pong"
}

pub async fn status(State(state): State<SystemAppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        uptime_secs: state.started_at.elapsed().as_secs(),
        reporters: state.agents.connection_count(),
        clients: state.dashboards.connection_count(),
    })
}

pub fn system_routes() -> Router<SystemAppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/status", get(status))
}
