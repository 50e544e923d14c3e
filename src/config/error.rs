//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: u64 },

    #[error("CORS origin {0:?} must start with http:// or https://")]
    InvalidCorsOrigin(String),

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Websocket path {0:?} must start with '/'")]
    InvalidPath(String),

    #[error("Reporter and client websocket paths must differ")]
    DuplicatePath,
}
