//! Bounded TTL memoization for provider lookups.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// LRU cache whose entries expire after a TTL.
///
/// Capacity and TTL are bounded by configuration (≤ 1000 entries, ≤ 5
/// minutes in the default config).
pub struct ProviderCache<T> {
    inner: Mutex<LruCache<String, (Instant, T)>>,
    ttl: Duration,
}

impl<T: Clone> ProviderCache<T> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to >= 1");
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Fetch a live entry; expired entries are evicted on access.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut cache = self.inner.lock().expect("cache mutex poisoned");
        match cache.get(key) {
            Some((inserted_at, value)) if inserted_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: String, value: T) {
        let mut cache = self.inner.lock().expect("cache mutex poisoned");
        cache.put(key, (Instant::now(), value));
    }
}
