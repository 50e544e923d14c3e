//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    spawn_key_sweeper, DeleteMachineCommand, DeleteMachineHandler, IssuedKey,
    ListMachinesHandler, ListMachinesQuery, PairingAuthority, PairingPolicy,
    RegisterMachineCommand, RegisterMachineResult, RegistrationOrchestrator,
};
