//! Top-level router: `/v1` REST endpoints plus the two websocket paths.

use std::sync::Arc;
use std::time::Instant;

use ::http::HeaderValue;
use axum::{middleware, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{websocket_router, RealtimeHub, WebSocketState};
use crate::application::{PairingAuthority, RegistrationOrchestrator};
use crate::config::CorsOrigins;
use crate::domain::realtime::{AgentEvent, DashboardEvent};
use crate::ports::{MachineRepository, SessionValidator};

use super::machines::{machine_routes, MachinesAppState};
use super::middleware::auth_middleware;
use super::pairing::{pairing_routes, PairingAppState};
use super::system::{system_routes, SystemAppState};

/// Everything the HTTP and websocket surfaces depend on.
#[derive(Clone)]
pub struct AppState {
    pub authority: Arc<PairingAuthority>,
    pub orchestrator: Arc<RegistrationOrchestrator>,
    pub machines: Arc<dyn MachineRepository>,
    pub sessions: Arc<dyn SessionValidator>,
    pub agents: Arc<RealtimeHub<AgentEvent>>,
    pub dashboards: Arc<RealtimeHub<DashboardEvent>>,
    pub started_at: Instant,
}

/// Paths and CORS origins taken from configuration.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub agent_path: String,
    pub dashboard_path: String,
    pub cors: CorsOrigins,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            agent_path: "/reporter".to_string(),
            dashboard_path: "/client".to_string(),
            cors: CorsOrigins::Any,
        }
    }
}

fn cors_layer(cors: &CorsOrigins) -> CorsLayer {
    let origins = match cors {
        CorsOrigins::Any => return CorsLayer::permissive(),
        CorsOrigins::List(origins) => origins,
    };
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Builds the complete application router.
pub fn build_router(state: AppState, settings: &RouterSettings) -> Router {
    let v1 = Router::new()
        .merge(pairing_routes().with_state(PairingAppState {
            authority: state.authority.clone(),
            orchestrator: state.orchestrator.clone(),
        }))
        .merge(machine_routes().with_state(MachinesAppState {
            machines: state.machines.clone(),
        }))
        .merge(system_routes().with_state(SystemAppState {
            agents: state.agents.clone(),
            dashboards: state.dashboards.clone(),
            started_at: state.started_at,
        }))
        .layer(middleware::from_fn_with_state(state.sessions.clone(), auth_middleware));

    let realtime = websocket_router(&settings.agent_path, &settings.dashboard_path)
        .with_state(WebSocketState::new(state.agents.clone(), state.dashboards.clone()));

    Router::new()
        .nest("/v1", v1)
        .merge(realtime)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&settings.cors))
}
