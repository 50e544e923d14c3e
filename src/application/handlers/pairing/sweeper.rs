//! Periodic removal of expired pairing keys.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::ports::{Clock, PairingKeyStore};

/// Spawns a task that sweeps expired keys every `every`.
///
/// The task runs until its handle is aborted.
pub fn spawn_key_sweeper(
    store: Arc<dyn PairingKeyStore>,
    clock: Arc<dyn Clock>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.sweep_expired(clock.now()).await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "Swept expired pairing keys"),
                Err(e) => tracing::warn!(error = %e, "Pairing key sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::pairing::InMemoryPairingKeyStore;
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::pairing::PairingKey;

    #[tokio::test(start_paused = true)]
    async fn sweeper_removes_expired_keys() {
        let t0 = Timestamp::from_unix_millis(0);
        let store = Arc::new(InMemoryPairingKeyStore::new());
        let clock = Arc::new(ManualClock::new(t0));
        store
            .insert(PairingKey::issue(
                UserId::new("u1").unwrap(),
                chrono::Duration::seconds(1),
                t0,
            ))
            .await
            .unwrap();
        clock.advance(chrono::Duration::seconds(5));

        let handle = spawn_key_sweeper(store.clone(), clock, Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        handle.abort();

        assert!(store.is_empty());
    }
}
