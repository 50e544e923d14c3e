//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid transition error from two debuggable states.
    pub fn invalid_transition(from: impl fmt::Debug, to: impl fmt::Debug) -> Self {
        ValidationError::InvalidTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }
}

/// Stable outcome codes surfaced to clients.
///
/// Client software branches on these strings, so they never change once
/// published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Pairing and registration outcomes
    KeyExpiredOrInvalid,
    MachineAlreadyRegistered,
    OwnerNotFound,

    // Not found errors
    MachineNotFound,

    // Authorization errors
    Unauthenticated,
    Forbidden,

    // Infrastructure errors
    StorageError,
    AuthUnavailable,
}

impl ErrorCode {
    /// Returns the wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::KeyExpiredOrInvalid => "KEY_EXPIRED_OR_INVALID",
            ErrorCode::MachineAlreadyRegistered => "MACHINE_ALREADY_REGISTERED",
            ErrorCode::OwnerNotFound => "OWNER_NOT_FOUND",
            ErrorCode::MachineNotFound => "MACHINE_NOT_FOUND",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::AuthUnavailable => "AUTH_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("hostname");
        assert_eq!(format!("{}", err), "Field 'hostname' cannot be empty");
    }

    #[test]
    fn validation_error_invalid_format_names_the_reason() {
        let err = ValidationError::invalid_format("machine_id", "not a UUID");
        assert_eq!(
            format!("{}", err),
            "Field 'machine_id' has invalid format: not a UUID"
        );
    }

    #[test]
    fn validation_error_invalid_transition_uses_debug_names() {
        #[derive(Debug)]
        enum S {
            Open,
            Closed,
        }
        let err = ValidationError::invalid_transition(S::Closed, S::Open);
        assert_eq!(format!("{}", err), "Invalid state transition from Closed to Open");
    }

    #[test]
    fn pairing_and_registration_codes_are_distinct() {
        assert_eq!(ErrorCode::KeyExpiredOrInvalid.to_string(), "KEY_EXPIRED_OR_INVALID");
        assert_eq!(
            ErrorCode::MachineAlreadyRegistered.to_string(),
            "MACHINE_ALREADY_REGISTERED"
        );
        assert_ne!(
            ErrorCode::KeyExpiredOrInvalid.as_str(),
            ErrorCode::MachineAlreadyRegistered.as_str()
        );
    }

    #[test]
    fn storage_error_code_is_stable() {
        assert_eq!(ErrorCode::StorageError.as_str(), "STORAGE_ERROR");
    }
}
