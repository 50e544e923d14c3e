//! Pairing token value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{generate_secret, ValidationError};

/// Opaque single-use secret that identifies a pairing key.
///
/// The token is both the lookup key and the credential, so `Debug` redacts it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairingToken(String);

impl PairingToken {
    /// Generates a fresh token with 256 bits of entropy.
    pub fn generate() -> Self {
        Self(generate_secret())
    }

    /// Wraps a token received from a client.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::empty_field("two_factor_key"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for PairingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PairingToken(..)")
    }
}
