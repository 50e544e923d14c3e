//! Pairing errors.

use thiserror::Error;

use crate::domain::foundation::ErrorCode;

/// Failures of the pairing flow.
///
/// `KeyExpiredOrInvalid` deliberately covers unknown, expired and already
/// consumed keys alike.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("the pairing key has expired or is invalid")]
    KeyExpiredOrInvalid,

    #[error("user {0} does not exist")]
    OwnerNotFound(String),

    #[error("pairing storage failure: {0}")]
    Storage(String),
}

impl PairingError {
    pub fn storage(message: impl Into<String>) -> Self {
        PairingError::Storage(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            PairingError::KeyExpiredOrInvalid => ErrorCode::KeyExpiredOrInvalid,
            PairingError::OwnerNotFound(_) => ErrorCode::OwnerNotFound,
            PairingError::Storage(_) => ErrorCode::StorageError,
        }
    }
}
