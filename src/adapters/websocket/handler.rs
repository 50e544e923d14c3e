//! WebSocket upgrade routes for reporters and dashboards.
//!
//! Authentication happens in-band: the first `login` event carries the
//! machine access token (reporters) or the user session token (dashboards).

use std::sync::Arc;

use axum::{extract::State, response::Response, routing::get, Router};
use axum::extract::ws::WebSocketUpgrade;

use crate::domain::realtime::{AgentEvent, DashboardEvent};

use super::hub::RealtimeHub;
use super::transport::upgrade;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub agents: Arc<RealtimeHub<AgentEvent>>,
    pub dashboards: Arc<RealtimeHub<DashboardEvent>>,
}

impl WebSocketState {
    pub fn new(
        agents: Arc<RealtimeHub<AgentEvent>>,
        dashboards: Arc<RealtimeHub<DashboardEvent>>,
    ) -> Self {
        Self { agents, dashboards }
    }
}

/// Route: `GET {agent_path}` (default `/reporter`)
pub async fn agent_ws_handler(ws: WebSocketUpgrade, State(state): State<WebSocketState>) -> Response {
    upgrade(ws, state.agents)
}

/// Route: `GET {dashboard_path}` (default `/client`)
pub async fn dashboard_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<WebSocketState>,
) -> Response {
    upgrade(ws, state.dashboards)
}

/// Creates the WebSocket router.
pub fn websocket_router(agent_path: &str, dashboard_path: &str) -> Router<WebSocketState> {
    Router::new()
        .route(agent_path, get(agent_ws_handler))
        .route(dashboard_path, get(dashboard_ws_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state() -> WebSocketState {
        WebSocketState::new(
            Arc::new(RealtimeHub::new("agent")),
            Arc::new(RealtimeHub::new("dashboard")),
        )
    }

    #[tokio::test]
    async fn plain_get_without_upgrade_headers_is_rejected() {
        let app = websocket_router("/reporter", "/client").with_state(state());

        let response = app
            .oneshot(Request::builder().uri("/reporter").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let app = websocket_router("/reporter", "/client").with_state(state());

        let response = app
            .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
