//! DeleteMachine - removes a machine on behalf of its owner.

use std::sync::Arc;

use crate::domain::foundation::{MachineId, UserId};
use crate::domain::machine::MachineError;
use crate::ports::MachineRepository;

#[derive(Debug, Clone)]
pub struct DeleteMachineCommand {
    pub machine_id: MachineId,
    pub requested_by: UserId,
}

pub struct DeleteMachineHandler {
    machines: Arc<dyn MachineRepository>,
}

impl DeleteMachineHandler {
    pub fn new(machines: Arc<dyn MachineRepository>) -> Self {
        Self { machines }
    }

    pub async fn handle(&self, cmd: DeleteMachineCommand) -> Result<(), MachineError> {
        let storage = |e: crate::ports::MachineRepositoryError| MachineError::Storage(e.to_string());

        // 1. Load and check ownership
        let machine = self
            .machines
            .find_by_id(&cmd.machine_id)
            .await
            .map_err(storage)?
            .ok_or(MachineError::NotFound(cmd.machine_id))?;
        if !machine.is_owned_by(&cmd.requested_by) {
            return Err(MachineError::Forbidden(cmd.machine_id));
        }

        // 2. Delete; a concurrent delete reads as not found
        if !self.machines.delete(&cmd.machine_id).await.map_err(storage)? {
            return Err(MachineError::NotFound(cmd.machine_id));
        }

        tracing::info!(machine_id = %cmd.machine_id, owner_id = %cmd.requested_by, "Machine deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::machine::InMemoryMachineRepository;
    use crate::domain::foundation::HardwareId;
    use crate::domain::machine::NewMachine;

    async fn setup() -> (Arc<InMemoryMachineRepository>, MachineId) {
        let repo = Arc::new(InMemoryMachineRepository::new());
        let machine = repo
            .create(NewMachine {
                owner_id: UserId::new("u1").unwrap(),
                hardware_id: HardwareId::new("hw-1").unwrap(),
                hostname: "box1".into(),
            })
            .await
            .unwrap();
        (repo, machine.id())
    }

    #[tokio::test]
    async fn owner_can_delete() {
        let (repo, id) = setup().await;
        let handler = DeleteMachineHandler::new(repo.clone());

        handler
            .handle(DeleteMachineCommand {
                machine_id: id,
                requested_by: UserId::new("u1").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn other_user_is_forbidden() {
        let (repo, id) = setup().await;
        let handler = DeleteMachineHandler::new(repo.clone());

        let err = handler
            .handle(DeleteMachineCommand {
                machine_id: id,
                requested_by: UserId::new("u2").unwrap(),
            })
            .await
            .unwrap_err();

        assert_eq!(err, MachineError::Forbidden(id));
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn missing_machine_is_not_found() {
        let (repo, _) = setup().await;
        let handler = DeleteMachineHandler::new(repo);
        let ghost = MachineId::new();

        let err = handler
            .handle(DeleteMachineCommand {
                machine_id: ghost,
                requested_by: UserId::new("u1").unwrap(),
            })
            .await
            .unwrap_err();

        assert_eq!(err, MachineError::NotFound(ghost));
    }
}
