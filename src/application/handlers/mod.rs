//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod machine;
pub mod pairing;

pub use machine::{
    DeleteMachineCommand, DeleteMachineHandler, ListMachinesHandler, ListMachinesQuery,
    RegisterMachineCommand, RegisterMachineResult, RegistrationOrchestrator,
};
pub use pairing::{spawn_key_sweeper, IssuedKey, PairingAuthority, PairingPolicy};
