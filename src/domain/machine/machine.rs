//! Machine aggregate.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{MachineStatus, StaticData};
use crate::domain::foundation::{
    generate_secret, HardwareId, MachineId, StateMachine, Timestamp, UserId, ValidationError,
};

/// Long-lived credential a machine uses to open its realtime channel.
///
/// Minted once at registration and never regenerated implicitly.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn generate() -> Self {
        Self(generate_secret())
    }

    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::empty_field("auth_token"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Attributes the registration flow hands to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMachine {
    pub owner_id: UserId,
    pub hardware_id: HardwareId,
    pub hostname: String,
}

/// A registered physical machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    id: MachineId,
    owner_id: UserId,
    hardware_id: HardwareId,
    hostname: String,
    access_token: AccessToken,
    status: MachineStatus,
    static_data: Option<StaticData>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Machine {
    /// Creates a machine with a fresh id and access token.
    pub fn register(new: NewMachine, now: Timestamp) -> Self {
        Self {
            id: MachineId::new(),
            owner_id: new.owner_id,
            hardware_id: new.hardware_id,
            hostname: new.hostname,
            access_token: AccessToken::generate(),
            status: MachineStatus::Unknown,
            static_data: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> MachineId {
        self.id
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn hardware_id(&self) -> &HardwareId {
        &self.hardware_id
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn status(&self) -> MachineStatus {
        self.status
    }

    pub fn static_data(&self) -> Option<&StaticData> {
        self.static_data.as_ref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }

    /// Moves to `status`; setting the current status again is a no-op.
    pub fn set_status(&mut self, status: MachineStatus, now: Timestamp) -> Result<(), ValidationError> {
        if self.status == status {
            return Ok(());
        }
        self.status = self.status.transition_to(status)?;
        self.updated_at = now;
        Ok(())
    }

    /// Replaces the static description; a reported hostname wins over the
    /// one given at registration.
    pub fn update_static_data(&mut self, data: StaticData, now: Timestamp) {
        if let Some(hostname) = data.hostname.as_ref().filter(|h| !h.is_empty()) {
            self.hostname = hostname.clone();
        }
        self.static_data = Some(data);
        self.updated_at = now;
    }
}
