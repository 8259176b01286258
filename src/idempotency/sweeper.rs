use std::sync::Arc;
use std::time::Duration;
use tokio::time;

use super::IdempotencyStore;
use crate::metrics;
use crate::rate_limit::RateLimiter;

/// Background task that periodically evicts expired idempotency records
///
/// Also drops rate-limit windows for clients that have gone quiet, so neither
/// map grows with the number of distinct requesters over the process lifetime.
pub struct CacheSweepTask<V> {
    store: Arc<IdempotencyStore<V>>,
    rate_limiter: Arc<RateLimiter>,
    sweep_interval: Duration,
}

impl<V: Clone + Send + Sync> CacheSweepTask<V> {
    pub fn new(
        store: Arc<IdempotencyStore<V>>,
        rate_limiter: Arc<RateLimiter>,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            store,
            rate_limiter,
            sweep_interval,
        }
    }

    /// One eviction pass; returns the number of idempotency records removed
    pub async fn sweep_once(&self) -> usize {
        let evicted = self.store.evict_expired().await;
        if evicted > 0 {
            tracing::info!(evicted = evicted, "Evicted expired idempotency records");
            metrics::IDEMPOTENCY_EVICTED_TOTAL.inc_by(evicted as u64);
        } else {
            tracing::debug!("No expired idempotency records to evict");
        }

        let remaining = self.store.len().await;
        metrics::IDEMPOTENCY_RECORDS.set(remaining as i64);

        let pruned = self.rate_limiter.prune().await;
        if pruned > 0 {
            tracing::debug!(pruned = pruned, "Pruned idle rate-limit windows");
        }

        evicted
    }

    /// Runs indefinitely; spawn it on the runtime
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.sweep_interval.as_secs(),
            ttl_secs = self.store.ttl().as_secs(),
            "Starting idempotency sweep task"
        );

        let mut interval = time::interval(self.sweep_interval);

        loop {
            interval.tick().await;
            self.sweep_once().await;
        }
    }
}
