//! RegisterMachine - redeems a pairing key and persists a new machine.

use std::sync::Arc;

use crate::application::handlers::pairing::PairingAuthority;
use crate::domain::foundation::{HardwareId, ValidationError};
use crate::domain::machine::{AccessToken, NewMachine, RegistrationError};
use crate::domain::pairing::PairingToken;
use crate::ports::{MachineRepository, MachineRepositoryError, UserRepository};

/// What an agent installer submits.
#[derive(Debug, Clone)]
pub struct RegisterMachineCommand {
    pub token: PairingToken,
    pub hardware_id: HardwareId,
    pub hostname: String,
}

impl RegisterMachineCommand {
    /// Builds a command from raw request fields, rejecting empty values.
    pub fn new(token: &str, hardware_id: &str, hostname: &str) -> Result<Self, ValidationError> {
        let hostname = hostname.trim();
        if hostname.is_empty() {
            return Err(ValidationError::empty_field("hostname"));
        }
        Ok(Self {
            token: PairingToken::parse(token)?,
            hardware_id: HardwareId::new(hardware_id)?,
            hostname: hostname.to_string(),
        })
    }
}

/// Only the access token leaves this operation.
#[derive(Debug, Clone)]
pub struct RegisterMachineResult {
    pub access_token: AccessToken,
}

/// Orchestrates key redemption and machine creation.
pub struct RegistrationOrchestrator {
    authority: Arc<PairingAuthority>,
    users: Arc<dyn UserRepository>,
    machines: Arc<dyn MachineRepository>,
}

impl RegistrationOrchestrator {
    pub fn new(
        authority: Arc<PairingAuthority>,
        users: Arc<dyn UserRepository>,
        machines: Arc<dyn MachineRepository>,
    ) -> Self {
        Self {
            authority,
            users,
            machines,
        }
    }

    pub async fn register_machine(
        &self,
        cmd: RegisterMachineCommand,
    ) -> Result<RegisterMachineResult, RegistrationError> {
        // 1. Redeem the key; every failure looks the same to the caller
        let owner_id = self
            .authority
            .validate(&cmd.token)
            .await
            .ok_or(RegistrationError::KeyExpiredOrInvalid)?;

        // 2. The owner may have been deleted while the key was live
        let owner = self
            .users
            .find_by_id(&owner_id)
            .await
            .map_err(|e| RegistrationError::Storage(e.to_string()))?;
        if owner.is_none() {
            tracing::warn!(owner_id = %owner_id, "Pairing key owner no longer exists");
            return Err(RegistrationError::OwnerNotFound);
        }

        // 3. Persist; the repository owns hardware id uniqueness
        let machine = self
            .machines
            .create(NewMachine {
                owner_id: owner_id.clone(),
                hardware_id: cmd.hardware_id,
                hostname: cmd.hostname,
            })
            .await
            .map_err(|e| match e {
                MachineRepositoryError::DuplicateKey => RegistrationError::MachineAlreadyRegistered,
                other => {
                    tracing::error!(owner_id = %owner_id, error = %other, "Machine creation failed");
                    RegistrationError::Storage(other.to_string())
                }
            })?;

        tracing::info!(machine_id = %machine.id(), owner_id = %owner_id, "Machine registered");

        Ok(RegisterMachineResult {
            access_token: machine.access_token().clone(),
        })
    }
}
