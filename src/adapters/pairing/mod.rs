//! Pairing key store adapters.
//!
//! - `InMemoryPairingKeyStore` - single instance and tests
//! - `RedisPairingKeyStore` - shared store for multi-instance deployments

mod in_memory;
mod redis;

pub use in_memory::InMemoryPairingKeyStore;
pub use self::redis::RedisPairingKeyStore;
