//! Machine repository port.
//!
//! The document database holding machines is external; this is the slice
//! of it the registration flow and telemetry relay need.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{MachineId, UserId};
use crate::domain::machine::{AccessToken, Machine, MachineStatus, NewMachine, StaticData};

/// Repository for machine persistence.
///
/// Uniqueness of `(owner_id, hardware_id)` is enforced here, not by callers.
#[async_trait]
pub trait MachineRepository: Send + Sync {
    /// Persists a new machine, generating its id and access token.
    ///
    /// # Errors
    ///
    /// - `DuplicateKey` if the owner already has a machine with this hardware id
    /// - `Storage` on any other failure
    async fn create(&self, new: NewMachine) -> Result<Machine, MachineRepositoryError>;

    async fn find_by_id(&self, id: &MachineId) -> Result<Option<Machine>, MachineRepositoryError>;

    /// Looks up the machine a reporter authenticates as.
    async fn find_by_access_token(
        &self,
        token: &AccessToken,
    ) -> Result<Option<Machine>, MachineRepositoryError>;

    /// All machines of an owner, oldest first.
    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Machine>, MachineRepositoryError>;

    /// # Errors
    ///
    /// `NotFound` if no such machine exists.
    async fn set_status(
        &self,
        id: &MachineId,
        status: MachineStatus,
    ) -> Result<(), MachineRepositoryError>;

    /// # Errors
    ///
    /// `NotFound` if no such machine exists.
    async fn update_static_data(
        &self,
        id: &MachineId,
        data: StaticData,
    ) -> Result<(), MachineRepositoryError>;

    /// Deletes a machine, returning whether it existed.
    async fn delete(&self, id: &MachineId) -> Result<bool, MachineRepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineRepositoryError {
    #[error("uniqueness constraint violated")]
    DuplicateKey,

    #[error("machine {0} not found")]
    NotFound(MachineId),

    #[error("storage failure: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn _object_safe(_: &dyn MachineRepository) {}
}
