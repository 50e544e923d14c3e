//! PairingKey entity.

use chrono::Duration;

use super::{PairingError, PairingToken};
use crate::domain::foundation::{Timestamp, UserId};

/// A short-lived, single-use key binding an unregistered machine to a user.
///
/// # Invariants
///
/// - `expires_at = issued_at + ttl`
/// - redeemable iff `!consumed && now <= expires_at`
/// - `consumed` flips at most once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingKey {
    token: PairingToken,
    owner_id: UserId,
    issued_at: Timestamp,
    expires_at: Timestamp,
    consumed: bool,
}

impl PairingKey {
    /// Issues a new key with a freshly generated token.
    pub fn issue(owner_id: UserId, ttl: Duration, now: Timestamp) -> Self {
        Self::with_token(PairingToken::generate(), owner_id, ttl, now)
    }

    /// Issues a key around a caller-chosen token.
    pub fn with_token(token: PairingToken, owner_id: UserId, ttl: Duration, now: Timestamp) -> Self {
        Self {
            token,
            owner_id,
            issued_at: now,
            expires_at: now.add_duration(ttl),
            consumed: false,
        }
    }

    pub fn token(&self) -> &PairingToken {
        &self.token
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Expiry is exclusive of the boundary: a key is still valid at `expires_at`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now.is_after(&self.expires_at)
    }

    pub fn is_redeemable(&self, now: Timestamp) -> bool {
        !self.consumed && !self.is_expired(now)
    }

    /// Consumes the key and yields its owner.
    ///
    /// # Errors
    ///
    /// `KeyExpiredOrInvalid` if the key is expired or already consumed.
    pub fn redeem(&mut self, now: Timestamp) -> Result<UserId, PairingError> {
        if !self.is_redeemable(now) {
            return Err(PairingError::KeyExpiredOrInvalid);
        }
        self.consumed = true;
        Ok(self.owner_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn owner() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn t0() -> Timestamp {
        Timestamp::from_unix_millis(1_700_000_000_000)
    }

    #[test]
    fn issue_sets_expiry_from_ttl() {
        let key = PairingKey::issue(owner(), Duration::seconds(300), t0());
        assert_eq!(key.issued_at(), t0());
        assert_eq!(key.expires_at(), t0().plus_secs(300));
        assert!(!key.is_consumed());
    }

    #[test]
    fn redeem_returns_owner_once() {
        let mut key = PairingKey::issue(owner(), Duration::seconds(60), t0());
        assert_eq!(key.redeem(t0()), Ok(owner()));
        assert!(key.is_consumed());
        assert_eq!(key.redeem(t0()), Err(PairingError::KeyExpiredOrInvalid));
    }

    #[test]
    fn redeem_at_exact_expiry_succeeds() {
        let mut key = PairingKey::issue(owner(), Duration::seconds(60), t0());
        assert!(key.redeem(t0().plus_secs(60)).is_ok());
    }

    #[test]
    fn redeem_after_expiry_fails_without_consuming() {
        let mut key = PairingKey::issue(owner(), Duration::seconds(60), t0());
        let late = t0().add_duration(Duration::milliseconds(60_001));
        assert_eq!(key.redeem(late), Err(PairingError::KeyExpiredOrInvalid));
        assert!(!key.is_consumed());
    }

    proptest! {
        #[test]
        fn redeemable_iff_within_ttl(ttl_ms in 1i64..10_000_000, offset_ms in 0i64..20_000_000) {
            let key = PairingKey::issue(owner(), Duration::milliseconds(ttl_ms), t0());
            let now = t0().add_duration(Duration::milliseconds(offset_ms));
            prop_assert_eq!(key.is_redeemable(now), offset_ms <= ttl_ms);
        }
    }
}
