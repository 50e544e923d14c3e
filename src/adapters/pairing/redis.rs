//! Redis-backed pairing key store for multi-instance deployments.
//!
//! Each key is one Redis string holding a JSON record, written with
//! `SET NX PX` so Redis itself expires it. Redemption runs as a Lua script,
//! which Redis executes atomically.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Script;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::pairing::{PairingKey, PairingToken};
use crate::ports::{PairingKeyStore, PairingStoreError};

const DEFAULT_PREFIX: &str = "xornet:pairing";

/// Returns the owner id and flips `consumed`, or nil when not redeemable.
///
/// The rewrite drops the TTL, so it is restored from the record's own expiry
/// with `PEXPIREAT` (available on every Redis that runs Lua scripts).
const REDEEM_SCRIPT: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
  return false
end
local record = cjson.decode(raw)
if record.consumed then
  return false
end
if tonumber(ARGV[1]) > tonumber(record.expires_at_ms) then
  return false
end
record.consumed = true
redis.call('SET', KEYS[1], cjson.encode(record))
redis.call('PEXPIREAT', KEYS[1], string.format('%d', record.expires_at_ms))
return record.owner_id
"#;

#[derive(Debug, Serialize, Deserialize)]
struct StoredKey {
    owner_id: String,
    issued_at_ms: i64,
    expires_at_ms: i64,
    consumed: bool,
}

impl From<&PairingKey> for StoredKey {
    fn from(key: &PairingKey) -> Self {
        Self {
            owner_id: key.owner_id().as_str().to_string(),
            issued_at_ms: key.issued_at().as_unix_millis(),
            expires_at_ms: key.expires_at().as_unix_millis(),
            consumed: key.is_consumed(),
        }
    }
}

/// Pairing key store shared by every server instance.
#[derive(Clone)]
pub struct RedisPairingKeyStore {
    conn: MultiplexedConnection,
    prefix: String,
    redeem: Script,
}

impl RedisPairingKeyStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            prefix: DEFAULT_PREFIX.to_string(),
            redeem: Script::new(REDEEM_SCRIPT),
        }
    }

    /// Opens a multiplexed connection to `url`.
    pub async fn connect(url: &str) -> Result<Self, PairingStoreError> {
        let client = redis::Client::open(url)
            .map_err(|e: redis::RedisError| PairingStoreError::Unavailable(e.to_string()))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e: redis::RedisError| PairingStoreError::Unavailable(e.to_string()))?;
        Ok(Self::new(conn))
    }

    /// Namespaces keys, e.g. per environment sharing one Redis.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn redis_key(&self, token: &PairingToken) -> String {
        format!("{}:{}", self.prefix, token.as_str())
    }
}

#[async_trait]
impl PairingKeyStore for RedisPairingKeyStore {
    async fn insert(&self, key: PairingKey) -> Result<bool, PairingStoreError> {
        let ttl_ms = key
            .expires_at()
            .duration_since(&key.issued_at())
            .num_milliseconds()
            .max(1);
        let record = serde_json::to_string(&StoredKey::from(&key))
            .map_err(|e| PairingStoreError::Corrupt(e.to_string()))?;

        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(self.redis_key(key.token()))
            .arg(record)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| PairingStoreError::Unavailable(e.to_string()))?;

        Ok(reply.is_some())
    }

    async fn redeem(
        &self,
        token: &PairingToken,
        now: Timestamp,
    ) -> Result<Option<UserId>, PairingStoreError> {
        let mut conn = self.conn.clone();
        let owner: Option<String> = self
            .redeem
            .key(self.redis_key(token))
            .arg(now.as_unix_millis())
            .invoke_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| PairingStoreError::Unavailable(e.to_string()))?;

        owner
            .map(|id| UserId::new(id).map_err(|e| PairingStoreError::Corrupt(e.to_string())))
            .transpose()
    }

    async fn sweep_expired(&self, _now: Timestamp) -> Result<usize, PairingStoreError> {
        // Redis expires entries through PX.
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn stored_record_carries_expiry_in_millis() {
        let now = Timestamp::from_unix_millis(1_000);
        let key = PairingKey::issue(UserId::new("u1").unwrap(), Duration::seconds(5), now);
        let stored = StoredKey::from(&key);

        assert_eq!(stored.owner_id, "u1");
        assert_eq!(stored.issued_at_ms, 1_000);
        assert_eq!(stored.expires_at_ms, 6_000);
        assert!(!stored.consumed);
    }

    #[test]
    fn stored_record_field_names_match_redeem_script() {
        let key = PairingKey::issue(UserId::new("u1").unwrap(), Duration::seconds(5), Timestamp::now());
        let json = serde_json::to_value(StoredKey::from(&key)).unwrap();
        for field in ["owner_id", "expires_at_ms", "consumed"] {
            assert!(json.get(field).is_some(), "missing {}", field);
            assert!(REDEEM_SCRIPT.contains(field));
        }
    }

    #[test]
    fn redeem_script_restores_expiry_from_the_record() {
        assert!(REDEEM_SCRIPT.contains("PEXPIREAT"));
        assert!(!REDEEM_SCRIPT.contains("KEEPTTL"));
    }

    // Needs a live Redis: REDIS_URL=redis://127.0.0.1/ cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn redeem_against_live_redis_succeeds_once() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".into());
        let store = RedisPairingKeyStore::connect(&url)
            .await
            .unwrap()
            .with_prefix("xornet:test:pairing");
        let now = Timestamp::now();
        let key = PairingKey::issue(UserId::new("u1").unwrap(), Duration::seconds(30), now);
        let token = key.token().clone();

        assert!(store.insert(key.clone()).await.unwrap());
        assert!(!store.insert(key).await.unwrap());
        assert_eq!(store.redeem(&token, now).await.unwrap(), UserId::new("u1").ok());
        assert_eq!(store.redeem(&token, now).await.unwrap(), None);
    }
}
