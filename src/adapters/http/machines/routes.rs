//! Axum router for machine management.

use axum::{
    routing::{delete, get},
    Router,
};

use super::handlers::{delete_machine, list_my_machines, MachinesAppState};

/// Create the machine router, mounted under `/v1`. All routes require authentication.
pub fn machine_routes() -> Router<MachinesAppState> {
    Router::new()
        .route("/users/@me/machines", get(list_my_machines))
        .route("/machines/:id", delete(delete_machine))
}
