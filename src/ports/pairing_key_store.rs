//! Pairing key store port.
//!
//! A key-value store with one atomic check-and-set operation. A single
//! process uses the in-memory adapter; several instances behind a load
//! balancer share a Redis-backed one without `PairingAuthority` noticing.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::pairing::{PairingKey, PairingToken};

/// Storage for active pairing keys.
///
/// # Contract
///
/// - `redeem` is the only mutation after insertion and must be atomic: of
///   any number of concurrent calls for one token, at most one returns
///   `Some`.
/// - Expired entries behave as absent whether or not they were swept.
#[async_trait]
pub trait PairingKeyStore: Send + Sync {
    /// Stores `key` unless an entry with the same token already exists.
    ///
    /// Returns `Ok(false)` on a token collision; nothing is overwritten.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the backing store cannot be reached.
    async fn insert(&self, key: PairingKey) -> Result<bool, PairingStoreError>;

    /// Atomically checks and consumes a key.
    ///
    /// Returns the owner if the key existed, was not consumed and
    /// `now <= expires_at`; `None` for every other case.
    async fn redeem(
        &self,
        token: &PairingToken,
        now: Timestamp,
    ) -> Result<Option<UserId>, PairingStoreError>;

    /// Physically removes entries past their expiry, returning how many.
    ///
    /// Bounds memory only; correctness never depends on it.
    async fn sweep_expired(&self, now: Timestamp) -> Result<usize, PairingStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingStoreError {
    #[error("pairing key store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt pairing key record: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn _object_safe(_: &dyn PairingKeyStore) {}
}
