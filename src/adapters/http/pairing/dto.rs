//! Request and response bodies for the pairing endpoints.

use serde::{Deserialize, Serialize};

use crate::application::IssuedKey;

/// Response of `GET /v1/machines/@newkey`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewKeyResponse {
    pub key: String,
    /// RFC 3339 expiry instant.
    pub expires_at: String,
}

impl From<IssuedKey> for NewKeyResponse {
    fn from(issued: IssuedKey) -> Self {
        Self {
            expires_at: issued.expires_at.to_rfc3339(),
            key: issued.token.into_inner(),
        }
    }
}

/// Body of `POST /v1/machines/@signup`.
///
/// Missing fields deserialize as empty and fail validation with a 400.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub two_factor_key: String,
    pub hardware_uuid: String,
    pub hostname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignupResponse {
    pub access_token: String,
}
