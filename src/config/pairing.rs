//! Pairing key configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound for `key_ttl_secs` (one day).
pub const MAX_KEY_TTL_SECS: u64 = 86_400;

/// Where pairing keys live.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PairingStoreKind {
    /// Process memory; keys do not survive a restart.
    #[default]
    Memory,
    /// Shared Redis instance (`redis.url`).
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    /// Lifetime of an issued key
    pub key_ttl_secs: u64,

    /// How often expired keys are purged from memory
    pub sweep_interval_secs: u64,

    pub store: PairingStoreKind,

    /// Refuse to issue keys for users the user repository does not know
    pub require_known_owner: bool,
}

impl PairingConfig {
    pub fn key_ttl(&self) -> Duration {
        Duration::from_secs(self.key_ttl_secs)
    }

    /// Key lifetime as used by the pairing policy. Clamped to `MAX_KEY_TTL_SECS`.
    pub fn key_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.key_ttl_secs.min(MAX_KEY_TTL_SECS) as i64)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key_ttl_secs == 0 {
            return Err(ValidationError::MustBePositive("pairing.key_ttl_secs"));
        }
        if self.key_ttl_secs > MAX_KEY_TTL_SECS {
            return Err(ValidationError::TooLarge {
                field: "pairing.key_ttl_secs",
                max: MAX_KEY_TTL_SECS,
            });
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::MustBePositive("pairing.sweep_interval_secs"));
        }
        Ok(())
    }
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            key_ttl_secs: 300,
            sweep_interval_secs: 60,
            store: PairingStoreKind::Memory,
            require_known_owner: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PairingConfig::default();
        assert_eq!(config.key_ttl(), Duration::from_secs(300));
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.store, PairingStoreKind::Memory);
        assert!(config.require_known_owner);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let config = PairingConfig {
            key_ttl_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MustBePositive("pairing.key_ttl_secs"))
        );
    }

    #[test]
    fn test_day_long_ttl_is_the_limit() {
        let config = PairingConfig {
            key_ttl_secs: MAX_KEY_TTL_SECS + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.key_ttl_chrono(), chrono::Duration::days(1));
    }

    #[test]
    fn test_zero_sweep_interval_is_rejected() {
        let config = PairingConfig {
            sweep_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
