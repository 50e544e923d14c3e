//! Response bodies for machine management.

use serde::{Deserialize, Serialize};

use crate::domain::machine::{Machine, MachineStatus, StaticData};

/// A machine as shown to its owner. The access token is never included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MachineSummary {
    pub uuid: String,
    pub hostname: String,
    pub hardware_uuid: String,
    pub status: MachineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_data: Option<StaticData>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Machine> for MachineSummary {
    fn from(machine: &Machine) -> Self {
        Self {
            uuid: machine.id().to_string(),
            hostname: machine.hostname().to_string(),
            hardware_uuid: machine.hardware_id().as_str().to_string(),
            status: machine.status(),
            static_data: machine.static_data().cloned(),
            created_at: machine.created_at().to_rfc3339(),
            updated_at: machine.updated_at().to_rfc3339(),
        }
    }
}
