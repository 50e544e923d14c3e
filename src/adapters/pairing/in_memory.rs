//! In-memory pairing key store for single-instance deployments and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::pairing::{PairingKey, PairingToken};
use crate::ports::{PairingKeyStore, PairingStoreError};

/// Process-local key table.
///
/// Every operation is one critical section over a std mutex and never
/// awaits while holding it, so redeem is a single check-and-mark.
#[derive(Debug, Default)]
pub struct InMemoryPairingKeyStore {
    keys: Mutex<HashMap<PairingToken, PairingKey>>,
}

impl InMemoryPairingKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries physically held, including dead ones not yet swept.
    pub fn len(&self) -> usize {
        self.keys.lock().map(|keys| keys.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<PairingToken, PairingKey>>, PairingStoreError> {
        self.keys
            .lock()
            .map_err(|_| PairingStoreError::Unavailable("pairing key table poisoned".to_string()))
    }
}

#[async_trait]
impl PairingKeyStore for InMemoryPairingKeyStore {
    async fn insert(&self, key: PairingKey) -> Result<bool, PairingStoreError> {
        let mut keys = self.lock()?;
        if keys.contains_key(key.token()) {
            return Ok(false);
        }
        keys.insert(key.token().clone(), key);
        Ok(true)
    }

    async fn redeem(
        &self,
        token: &PairingToken,
        now: Timestamp,
    ) -> Result<Option<UserId>, PairingStoreError> {
        let mut keys = self.lock()?;
        let Some(key) = keys.get_mut(token) else {
            return Ok(None);
        };
        // Consumed entries stay until expiry so the token is never reissued.
        Ok(key.redeem(now).ok())
    }

    async fn sweep_expired(&self, now: Timestamp) -> Result<usize, PairingStoreError> {
        let mut keys = self.lock()?;
        let before = keys.len();
        keys.retain(|_, key| !key.is_expired(now));
        Ok(before - keys.len())
    }
}
