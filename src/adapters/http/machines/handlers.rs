//! HTTP handlers for machine management.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::{
    DeleteMachineCommand, DeleteMachineHandler, ListMachinesHandler, ListMachinesQuery,
};
use crate::domain::foundation::{MachineId, ValidationError};
use crate::ports::MachineRepository;

use super::dto::MachineSummary;

#[derive(Clone)]
pub struct MachinesAppState {
    pub machines: Arc<dyn MachineRepository>,
}

impl MachinesAppState {
    pub fn list_machines_handler(&self) -> ListMachinesHandler {
        ListMachinesHandler::new(self.machines.clone())
    }

    pub fn delete_machine_handler(&self) -> DeleteMachineHandler {
        DeleteMachineHandler::new(self.machines.clone())
    }
}

/// GET /v1/users/@me/machines - List the current user's machines
pub async fn list_my_machines(
    State(state): State<MachinesAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let machines = state
        .list_machines_handler()
        .handle(ListMachinesQuery { owner_id: user.id })
        .await?;

    let response: Vec<MachineSummary> = machines.iter().map(MachineSummary::from).collect();
    Ok(Json(response))
}

/// DELETE /v1/machines/:id - Remove a machine the current user owns
pub async fn delete_machine(
    State(state): State<MachinesAppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let machine_id: MachineId = id
        .parse()
        .map_err(|_| ValidationError::invalid_format("machine_id", "expected a UUID"))?;

    state
        .delete_machine_handler()
        .handle(DeleteMachineCommand {
            machine_id,
            requested_by: user.id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
