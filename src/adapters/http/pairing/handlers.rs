//! HTTP handlers for the pairing endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::{PairingAuthority, RegisterMachineCommand, RegistrationOrchestrator};

use super::dto::{NewKeyResponse, SignupRequest, SignupResponse};

/// Dependencies of the pairing endpoints.
#[derive(Clone)]
pub struct PairingAppState {
    pub authority: Arc<PairingAuthority>,
    pub orchestrator: Arc<RegistrationOrchestrator>,
}

/// GET /v1/machines/@newkey - Issue a single-use pairing key
pub async fn create_new_key(
    State(state): State<PairingAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let issued = state.authority.create_new_key(&user.id).await?;
    Ok(Json(NewKeyResponse::from(issued)))
}

/// POST /v1/machines/@signup - Register a machine with a pairing key
///
/// Unauthenticated: the pairing key is the credential.
pub async fn signup(
    State(state): State<PairingAppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let cmd = RegisterMachineCommand::new(
        &request.two_factor_key,
        &request.hardware_uuid,
        &request.hostname,
    )?;

    let result = state.orchestrator.register_machine(cmd).await?;

    let response = SignupResponse {
        access_token: result.access_token.as_str().to_string(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}
