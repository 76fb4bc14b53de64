//! Time-bounded response cache with per-key request collapsing.
//!
//! Entries are fresh while `now - fetched_at < ttl`; stale entries are treated
//! as absent and replaced by the next successful fetch. Concurrent lookups for
//! a key without a fresh entry share a single in-flight fetch.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio::time::Instant;

use crate::models::NormalizedPayload;
use crate::request::{CacheKey, QueryRequest};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A stored fetch result. Never mutated; a later fetch replaces it.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Arc<NormalizedPayload>,
    pub fetched_at: Instant,
}

impl CacheEntry {
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

type Flight<E> = Arc<OnceCell<Result<Arc<NormalizedPayload>, E>>>;

struct CacheState<E> {
    entries: HashMap<CacheKey, CacheEntry>,
    in_flight: HashMap<CacheKey, Flight<E>>,
}

impl<E> CacheState<E> {
    fn fresh(&self, key: &CacheKey, ttl: Duration) -> Option<&CacheEntry> {
        self.entries.get(key).filter(|entry| entry.age() < ttl)
    }
}

/// Shared response cache, generic over the fetch error handed to waiters.
pub struct ResponseCache<E> {
    ttl: Duration,
    state: Mutex<CacheState<E>>,
}

impl<E: Clone> Default for ResponseCache<E> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<E: Clone> ResponseCache<E> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The entry for `key` if it is still fresh.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.lock().fresh(key, self.ttl).cloned()
    }

    /// Store `payload` under `key`, superseding any previous entry.
    pub fn put(&self, key: CacheKey, payload: NormalizedPayload) -> CacheEntry {
        let entry = CacheEntry {
            data: Arc::new(payload),
            fetched_at: Instant::now(),
        };
        self.lock().entries.insert(key, entry.clone());
        entry
    }

    /// Drop every entry whose request matches `predicate`. Matching in-flight
    /// fetches are detached: their waiters still get the result, but it is
    /// not stored. Returns the number of entries removed.
    pub fn invalidate<P>(&self, predicate: P) -> usize
    where
        P: Fn(&QueryRequest) -> bool,
    {
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|key, _| !predicate(key.request()));
        state.in_flight.retain(|key, _| !predicate(key.request()));
        before - state.entries.len()
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the fresh entry for `key`, or run `fetch` and store its result.
    ///
    /// While a fetch for `key` is running, other callers wait for it instead
    /// of starting their own, and all of them receive the same payload or the
    /// same error. Errors are never stored.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &CacheKey,
        fetch: F,
    ) -> Result<Arc<NormalizedPayload>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<NormalizedPayload, E>>,
    {
        let flight = {
            let mut state = self.lock();
            if let Some(entry) = state.fresh(key, self.ttl) {
                tracing::trace!(key = %key, "Cache hit");
                return Ok(entry.data.clone());
            }
            state
                .in_flight
                .entry(key.clone())
                .or_insert_with(|| {
                    tracing::trace!(key = %key, "Cache miss, starting fetch");
                    Arc::new(OnceCell::new())
                })
                .clone()
        };

        let this_flight = &flight;
        let result = flight
            .get_or_init(move || async move {
                let result = fetch().await.map(Arc::new);

                let mut state = self.lock();
                let attached = state
                    .in_flight
                    .get(key)
                    .is_some_and(|current| Arc::ptr_eq(current, this_flight));
                if attached {
                    state.in_flight.remove(key);
                    if let Ok(data) = &result {
                        state.entries.insert(
                            key.clone(),
                            CacheEntry {
                                data: data.clone(),
                                fetched_at: Instant::now(),
                            },
                        );
                    }
                } else {
                    tracing::trace!(key = %key, "Fetch detached by invalidation, not stored");
                }
                result
            })
            .await;

        result.clone()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
