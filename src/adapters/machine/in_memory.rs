//! In-memory machine repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{HardwareId, MachineId, Timestamp, UserId};
use crate::domain::machine::{AccessToken, Machine, MachineStatus, NewMachine, StaticData};
use crate::ports::{MachineRepository, MachineRepositoryError};

#[derive(Default)]
struct Tables {
    machines: HashMap<MachineId, Machine>,
    by_token: HashMap<AccessToken, MachineId>,
    by_hardware: HashMap<(UserId, HardwareId), MachineId>,
    /// Creation order, for stable listings.
    order: Vec<MachineId>,
}

/// Machine repository held in process memory.
///
/// Enforces `(owner_id, hardware_id)` uniqueness under the same write lock
/// as the insert.
#[derive(Clone, Default)]
pub struct InMemoryMachineRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryMachineRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.tables.read().await.machines.len()
    }
}

#[async_trait]
impl MachineRepository for InMemoryMachineRepository {
    async fn create(&self, new: NewMachine) -> Result<Machine, MachineRepositoryError> {
        let mut tables = self.tables.write().await;
        let unique = (new.owner_id.clone(), new.hardware_id.clone());
        if tables.by_hardware.contains_key(&unique) {
            return Err(MachineRepositoryError::DuplicateKey);
        }

        let machine = Machine::register(new, Timestamp::now());
        let id = machine.id();
        tables.by_hardware.insert(unique, id);
        tables.by_token.insert(machine.access_token().clone(), id);
        tables.order.push(id);
        tables.machines.insert(id, machine.clone());
        Ok(machine)
    }

    async fn find_by_id(&self, id: &MachineId) -> Result<Option<Machine>, MachineRepositoryError> {
        Ok(self.tables.read().await.machines.get(id).cloned())
    }

    async fn find_by_access_token(
        &self,
        token: &AccessToken,
    ) -> Result<Option<Machine>, MachineRepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_token
            .get(token)
            .and_then(|id| tables.machines.get(id))
            .cloned())
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Machine>, MachineRepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .order
            .iter()
            .filter_map(|id| tables.machines.get(id))
            .filter(|m| m.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn set_status(
        &self,
        id: &MachineId,
        status: MachineStatus,
    ) -> Result<(), MachineRepositoryError> {
        let mut tables = self.tables.write().await;
        let machine = tables
            .machines
            .get_mut(id)
            .ok_or(MachineRepositoryError::NotFound(*id))?;
        machine
            .set_status(status, Timestamp::now())
            .map_err(|e| MachineRepositoryError::Storage(e.to_string()))
    }

    async fn update_static_data(
        &self,
        id: &MachineId,
        data: StaticData,
    ) -> Result<(), MachineRepositoryError> {
        let mut tables = self.tables.write().await;
        let machine = tables
            .machines
            .get_mut(id)
            .ok_or(MachineRepositoryError::NotFound(*id))?;
        machine.update_static_data(data, Timestamp::now());
        Ok(())
    }

    async fn delete(&self, id: &MachineId) -> Result<bool, MachineRepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(machine) = tables.machines.remove(id) else {
            return Ok(false);
        };
        tables.by_token.remove(machine.access_token());
        tables
            .by_hardware
            .remove(&(machine.owner_id().clone(), machine.hardware_id().clone()));
        tables.order.retain(|other| other != id);
        Ok(true)
    }
}
