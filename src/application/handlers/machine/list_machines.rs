//! ListMachines - query for the machines a user owns.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::machine::{Machine, MachineError};
use crate::ports::MachineRepository;

#[derive(Debug, Clone)]
pub struct ListMachinesQuery {
    pub owner_id: UserId,
}

pub struct ListMachinesHandler {
    machines: Arc<dyn MachineRepository>,
}

impl ListMachinesHandler {
    pub fn new(machines: Arc<dyn MachineRepository>) -> Self {
        Self { machines }
    }

    pub async fn handle(&self, query: ListMachinesQuery) -> Result<Vec<Machine>, MachineError> {
        self.machines
            .find_by_owner(&query.owner_id)
            .await
            .map_err(|e| MachineError::Storage(e.to_string()))
    }
}
