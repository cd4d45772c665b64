//! In-memory cache with per-entry expiry.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expire_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expire_at
    }
}

/// Thread-safe key/value cache where every entry carries an explicit TTL.
///
/// Clones share the same storage.
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    map: Arc<DashMap<K, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<K, V> Clone for TtlCache<K, V>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            map: Arc::clone(&self.map),
            default_ttl: self.default_ttl,
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a cache whose entries live for `default_ttl` unless told otherwise.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            default_ttl,
        }
    }

    /// Default entry lifetime.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get a live value. Expired entries are removed on access.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let expired = match self.map.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        // The read guard is released above; removing while holding it would deadlock
        if expired {
            self.map.remove_if(key, |_, entry| entry.is_expired(now));
        }
        None
    }

    /// Insert with the default TTL.
    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    /// Insert with an explicit TTL.
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let expire_at = Instant::now() + ttl;
        self.map.insert(key, CacheEntry { value, expire_at });
    }

    /// Remove one entry, returning its value if it was still live.
    pub fn invalidate(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        self.map
            .remove(key)
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(_, entry)| entry.value)
    }

    /// Remove every entry.
    pub fn invalidate_all(&self) {
        self.map.clear();
    }

    /// Drop expired entries and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.map.len();
        self.map.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.map.len())
    }

    /// Number of stored entries, including ones that have expired but not been purged.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
