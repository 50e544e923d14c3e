//! Machine connectivity status.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Connectivity of a machine's reporter as last seen by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    /// Registered but no reporter has logged in yet.
    #[default]
    Unknown,
    Online,
    Offline,
}

impl StateMachine for MachineStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use MachineStatus::*;
        match self {
            Unknown => vec![Online, Offline],
            Online => vec![Offline],
            Offline => vec![Online],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_machines_start_unknown() {
        assert_eq!(MachineStatus::default(), MachineStatus::Unknown);
    }

    #[test]
    fn status_toggles_between_online_and_offline() {
        let online = MachineStatus::Unknown.transition_to(MachineStatus::Online).unwrap();
        let offline = online.transition_to(MachineStatus::Offline).unwrap();
        assert_eq!(offline.transition_to(MachineStatus::Online), Ok(MachineStatus::Online));
    }

    #[test]
    fn cannot_return_to_unknown() {
        assert!(MachineStatus::Online.transition_to(MachineStatus::Unknown).is_err());
        assert!(MachineStatus::Offline.transition_to(MachineStatus::Unknown).is_err());
    }

    #[test]
    fn no_status_is_terminal() {
        for s in [MachineStatus::Unknown, MachineStatus::Online, MachineStatus::Offline] {
            assert!(!s.is_terminal());
        }
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MachineStatus::Online).unwrap(), "\"online\"");
    }
}
