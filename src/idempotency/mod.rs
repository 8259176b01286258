// ============================================================================
// Idempotency Store
// ============================================================================
//
// Deduplicates client retries so one batch never spends sponsor gas twice.
//
// Flow:
// 1. Derive the key from (requester, ordered assets, ordered amounts)
// 2. Hit -> return the cached response and its age
// 3. Key in flight -> wait for the owner to finish, then look again
// 4. Miss -> caller owns the key, runs the full pipeline and completes the
//    reservation only on success; dropping it frees the key for a retry
// 5. CacheSweepTask evicts records older than the TTL on a fixed interval
//
// Records are inserted once and never updated in place. A record past its
// TTL is treated as a miss even if the sweep has not removed it yet.
// ============================================================================

mod sweeper;

use alloy::primitives::{Address, U256};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, watch};
use tokio::time::Instant;

pub use sweeper::CacheSweepTask;

/// Deterministic hash over a request's semantic content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Address case and amount formatting do not change the key
    pub fn derive(requester: &Address, assets: &[Address], amounts: &[U256]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(format!("{:#x}", requester).as_bytes());
        hasher.update(b"|");
        for asset in assets {
            hasher.update(format!("{:#x},", asset).as_bytes());
        }
        hasher.update(b"|");
        for amount in amounts {
            hasher.update(amount.to_string().as_bytes());
            hasher.update(b",");
        }
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct IdempotencyRecord<V> {
    created_at: Instant,
    response: V,
}

/// A cached response together with how long ago it was produced
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit<V> {
    pub response: V,
    pub age: Duration,
}

/// Outcome of [`IdempotencyStore::reserve`]
#[derive(Debug)]
pub enum Reservation<V> {
    /// A live record exists; replay it
    Cached(CacheHit<V>),
    /// The caller now owns the key until the reservation is completed or dropped
    Acquired(InFlight),
}

/// Ownership of a key whose request is being processed.
///
/// Concurrent callers with the same key wait while this is alive. Dropping it
/// without [`IdempotencyStore::complete`] wakes them without a record, and the
/// next one takes over.
#[derive(Debug)]
pub struct InFlight {
    key: IdempotencyKey,
    _done: watch::Sender<()>,
}

impl InFlight {
    pub fn key(&self) -> &IdempotencyKey {
        &self.key
    }
}

pub struct IdempotencyStore<V> {
    ttl: Duration,
    records: RwLock<HashMap<IdempotencyKey, IdempotencyRecord<V>>>,
    // Lock order: in_flight, then records
    in_flight: Mutex<HashMap<IdempotencyKey, watch::Receiver<()>>>,
}

impl<V: Clone + Send + Sync> IdempotencyStore<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            records: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached response for `key`, if one exists and is still inside the TTL
    pub async fn get(&self, key: &IdempotencyKey) -> Option<CacheHit<V>> {
        let records = self.records.read().await;
        self.live_hit(&records, key)
    }

    fn live_hit(
        &self,
        records: &HashMap<IdempotencyKey, IdempotencyRecord<V>>,
        key: &IdempotencyKey,
    ) -> Option<CacheHit<V>> {
        let record = records.get(key)?;
        let age = record.created_at.elapsed();
        if age >= self.ttl {
            return None;
        }
        Some(CacheHit {
            response: record.response.clone(),
            age,
        })
    }

    /// Look up `key`, waiting out any in-flight request for the same key.
    ///
    /// Returns the live record if one exists, otherwise makes the caller the
    /// key's owner.
    pub async fn reserve(&self, key: &IdempotencyKey) -> Reservation<V> {
        loop {
            let mut owner_done = {
                let mut in_flight = self.in_flight.lock().await;
                {
                    let records = self.records.read().await;
                    if let Some(hit) = self.live_hit(&records, key) {
                        return Reservation::Cached(hit);
                    }
                }

                // A closed channel means the previous owner gave up
                let live_owner = in_flight
                    .get(key)
                    .filter(|done| done.has_changed().is_ok())
                    .cloned();
                match live_owner {
                    Some(done) => done,
                    None => {
                        let (done_tx, done_rx) = watch::channel(());
                        in_flight.insert(key.clone(), done_rx);
                        return Reservation::Acquired(InFlight {
                            key: key.clone(),
                            _done: done_tx,
                        });
                    }
                }
            };

            tracing::debug!(key = %key, "Waiting for in-flight request with the same key");
            // Resolves once the owner completes or drops its reservation
            while owner_done.changed().await.is_ok() {}
        }
    }

    /// Record the successful response for an owned key and wake its waiters
    pub async fn complete(&self, reservation: InFlight, response: V) {
        let mut in_flight = self.in_flight.lock().await;
        self.insert(reservation.key.clone(), response).await;
        in_flight.remove(&reservation.key);
    }

    /// Store the response of a successful dispatch. An existing live record
    /// is kept as-is.
    pub async fn insert(&self, key: IdempotencyKey, response: V) {
        let mut records = self.records.write().await;
        let now = Instant::now();
        let ttl = self.ttl;
        records
            .entry(key)
            .and_modify(|existing| {
                if existing.created_at.elapsed() >= ttl {
                    *existing = IdempotencyRecord {
                        created_at: now,
                        response: response.clone(),
                    };
                }
            })
            .or_insert_with(|| IdempotencyRecord {
                created_at: now,
                response,
            });
    }

    /// Drop every record older than the TTL; returns how many were removed
    pub async fn evict_expired(&self) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        let ttl = self.ttl;
        records.retain(|_, record| record.created_at.elapsed() < ttl);
        let evicted = before - records.len();
        drop(records);

        self.in_flight
            .lock()
            .await
            .retain(|_, done| done.has_changed().is_ok());

        evicted
    }

    /// Keys currently owned by a request in progress
    pub async fn in_flight_len(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
