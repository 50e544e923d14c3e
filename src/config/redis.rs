//! Redis configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Redis configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis connection URL; required when `pairing.store = redis`
    pub url: Option<String>,

    /// Key namespace for pairing keys
    pub key_prefix: Option<String>,
}

impl RedisConfig {
    /// Validate Redis configuration
    pub fn validate(&self, required: bool) -> Result<(), ValidationError> {
        match self.url.as_deref() {
            None | Some("") if required => Err(ValidationError::MissingRequired("REDIS__URL")),
            None | Some("") => Ok(()),
            Some(url) if url.starts_with("redis://") || url.starts_with("rediss://") => Ok(()),
            Some(_) => Err(ValidationError::InvalidRedisUrl),
        }
    }
}
