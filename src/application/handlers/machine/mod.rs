//! Machine handlers.

mod delete_machine;
mod list_machines;
mod register_machine;

pub use delete_machine::{DeleteMachineCommand, DeleteMachineHandler};
pub use list_machines::{ListMachinesHandler, ListMachinesQuery};
pub use register_machine::{
    RegisterMachineCommand, RegisterMachineResult, RegistrationOrchestrator,
};
