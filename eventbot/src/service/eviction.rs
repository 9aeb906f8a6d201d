//! Periodic eviction of idle conversation state, running beside the main loop.

use std::time::Duration;

use eventbot_core::SessionStateStore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct EvictionSweeper {
    store: SessionStateStore,
    interval: Duration,
    idle_timeout: Duration,
}

impl EvictionSweeper {
    pub fn new(store: SessionStateStore, interval: Duration, idle_timeout: Duration) -> Self {
        Self {
            store,
            interval,
            idle_timeout,
        }
    }

    /// One sweep; returns how many states were evicted.
    pub async fn sweep_once(&self) -> usize {
        let evicted = self.store.evict_idle(self.idle_timeout).await;
        if evicted > 0 {
            info!(
                evicted,
                idle_timeout_secs = self.idle_timeout.as_secs(),
                "Evicted idle session states"
            );
        }
        evicted
    }

    /// Sweeps every `interval` until `token` is cancelled. `interval` must be non-zero.
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        self.sweep_once().await;
                    }
                }
            }
            debug!("Eviction sweeper stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eventbot_core::SessionState;

    #[tokio::test]
    async fn test_sweeper_evicts_in_background_and_stops_on_cancel() {
        let store = SessionStateStore::new();
        let mut stale = SessionState::new("stale");
        stale.last_updated = Utc::now() - chrono::Duration::hours(1);
        store.put("stale", stale).await;
        store.put("fresh", SessionState::new("fresh")).await;

        let token = CancellationToken::new();
        let handle = EvictionSweeper::new(
            store.clone(),
            Duration::from_millis(10),
            Duration::from_secs(60),
        )
        .spawn(token.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
        handle.await.unwrap();

        assert!(!store.contains("stale").await);
        assert!(store.contains("fresh").await);
    }

    #[tokio::test]
    async fn test_sweep_once_counts_evictions() {
        let store = SessionStateStore::new();
        let mut stale = SessionState::new("a");
        stale.last_updated = Utc::now() - chrono::Duration::seconds(10);
        store.put("a", stale).await;

        let sweeper = EvictionSweeper::new(store.clone(), Duration::from_secs(1), Duration::from_secs(5));

        assert_eq!(sweeper.sweep_once().await, 1);
        assert_eq!(sweeper.sweep_once().await, 0);
    }
}
