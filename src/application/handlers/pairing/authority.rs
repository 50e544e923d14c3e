//! PairingAuthority - issues and validates pairing keys.

use chrono::Duration;
use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::pairing::{PairingError, PairingKey, PairingToken};
use crate::ports::{Clock, PairingKeyStore, UserRepository};

/// Token generation is retried this many times on a store collision.
const MAX_ISSUE_ATTEMPTS: usize = 3;

/// How keys are issued.
#[derive(Debug, Clone, Copy)]
pub struct PairingPolicy {
    pub key_ttl: Duration,
    /// Refuse to issue keys for users the user repository does not know.
    pub require_known_owner: bool,
}

impl Default for PairingPolicy {
    fn default() -> Self {
        Self {
            key_ttl: Duration::minutes(5),
            require_known_owner: true,
        }
    }
}

/// A freshly issued key as handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedKey {
    pub token: PairingToken,
    pub expires_at: Timestamp,
}

/// Issues keys for logged-in users and resolves them back to owners.
pub struct PairingAuthority {
    store: Arc<dyn PairingKeyStore>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
    policy: PairingPolicy,
}

impl PairingAuthority {
    pub fn new(
        store: Arc<dyn PairingKeyStore>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
        policy: PairingPolicy,
    ) -> Self {
        Self {
            store,
            users,
            clock,
            policy,
        }
    }

    /// Issues a new single-use key for `user_id`.
    ///
    /// # Errors
    ///
    /// - `OwnerNotFound` if the owner check is enabled and the user is unknown
    /// - `Storage` if the user lookup or the key store fails
    pub async fn create_new_key(&self, user_id: &UserId) -> Result<IssuedKey, PairingError> {
        if self.policy.require_known_owner {
            let owner = self
                .users
                .find_by_id(user_id)
                .await
                .map_err(|e| PairingError::storage(e.to_string()))?;
            if owner.is_none() {
                return Err(PairingError::OwnerNotFound(user_id.to_string()));
            }
        }

        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let key = PairingKey::issue(user_id.clone(), self.policy.key_ttl, self.clock.now());
            let issued = IssuedKey {
                token: key.token().clone(),
                expires_at: key.expires_at(),
            };
            if self
                .store
                .insert(key)
                .await
                .map_err(|e| PairingError::storage(e.to_string()))?
            {
                tracing::info!(owner_id = %user_id, expires_at = %issued.expires_at, "Pairing key issued");
                return Ok(issued);
            }
            tracing::warn!(owner_id = %user_id, "Pairing token collision, regenerating");
        }

        Err(PairingError::storage("could not allocate a unique pairing token"))
    }

    /// Consumes `token` and returns its owner.
    ///
    /// Unknown, expired and already used keys all yield `None`. Store
    /// failures are logged and also yield `None`.
    pub async fn validate(&self, token: &PairingToken) -> Option<UserId> {
        match self.store.redeem(token, self.clock.now()).await {
            Ok(Some(owner)) => {
                tracing::info!(owner_id = %owner, "Pairing key redeemed");
                Some(owner)
            }
            Ok(None) => {
                tracing::debug!("Pairing key rejected");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Pairing key store failed during redeem");
                None
            }
        }
    }
}
