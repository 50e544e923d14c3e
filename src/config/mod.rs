//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `XORNET` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use xornet_backend::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod error;
mod pairing;
mod realtime;
mod redis;
mod server;

pub use auth::AuthConfig;
pub use error::{ConfigError, ValidationError};
pub use pairing::{PairingConfig, PairingStoreKind, MAX_KEY_TTL_SECS};
pub use realtime::RealtimeConfig;
pub use redis::RedisConfig;
pub use server::{CorsOrigins, Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// development setup backed by in-memory stores.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    pub server: ServerConfig,

    /// Pairing key lifetime and storage backend
    pub pairing: PairingConfig,

    /// Websocket paths, heartbeat and buffering
    pub realtime: RealtimeConfig,

    /// Session token validation
    pub auth: AuthConfig,

    /// Redis connection (pairing store)
    pub redis: RedisConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `XORNET` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// - `XORNET__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `XORNET__PAIRING__STORE=redis` -> `pairing.store = redis`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("XORNET")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.pairing.validate()?;
        self.realtime.validate()?;
        self.auth.validate(self.server.environment)?;
        self.redis
            .validate(self.pairing.store == PairingStoreKind::Redis)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
