//! Machine domain - registered devices, their status and telemetry.

mod errors;
mod machine;
mod status;
mod telemetry;

pub use errors::{MachineError, RegistrationError};
pub use machine::{AccessToken, Machine, NewMachine};
pub use status::MachineStatus;
pub use telemetry::{
    CpuStats, DynamicData, MachineSnapshot, NetworkInterfaceStats, RamStats, StaticData,
};
