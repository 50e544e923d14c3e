//! Machine registration and management errors.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | KeyExpiredOrInvalid | 403 |
//! | OwnerNotFound | 404 |
//! | MachineAlreadyRegistered | 400 |
//! | NotFound | 404 |
//! | Forbidden | 403 |
//! | Validation | 400 |
//! | Storage | 500 |

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, MachineId, ValidationError};

/// Outcomes of `register_machine` other than success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("the pairing key has expired or is invalid")]
    KeyExpiredOrInvalid,

    #[error("the user owning this pairing key no longer exists")]
    OwnerNotFound,

    #[error("this machine is already registered")]
    MachineAlreadyRegistered,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Opaque infrastructure failure; detail is for logs only.
    #[error("storage error: {0}")]
    Storage(String),
}

impl RegistrationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistrationError::KeyExpiredOrInvalid => ErrorCode::KeyExpiredOrInvalid,
            RegistrationError::OwnerNotFound => ErrorCode::OwnerNotFound,
            RegistrationError::MachineAlreadyRegistered => ErrorCode::MachineAlreadyRegistered,
            RegistrationError::Validation(_) => ErrorCode::ValidationFailed,
            RegistrationError::Storage(_) => ErrorCode::StorageError,
        }
    }
}

/// Errors from listing, deleting or updating machines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("machine {0} not found")]
    NotFound(MachineId),

    #[error("machine {0} belongs to another user")]
    Forbidden(MachineId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(String),
}

impl MachineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MachineError::NotFound(_) => ErrorCode::MachineNotFound,
            MachineError::Forbidden(_) => ErrorCode::Forbidden,
            MachineError::Validation(_) => ErrorCode::ValidationFailed,
            MachineError::Storage(_) => ErrorCode::StorageError,
        }
    }
}
