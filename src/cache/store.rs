//! Cache Store Module
//!
//! Single-threaded cache engine combining HashMap storage with LRU tracking and
//! TTL bookkeeping. [`LruTtlCache`](crate::LruTtlCache) wraps it in a mutex.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Cache Store ==
/// Main cache storage with LRU eviction and TTL support.
///
/// Every mutation updates the map and the recency list together, so the key
/// set of `entries` always equals the set of keys linked in `lru`.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
    /// Lifetime granted on insert and on every touch, None = no expiry
    default_ttl: Option<Duration>,
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries the cache can hold
    /// * `default_ttl` - Lifetime of each entry, None disables expiry
    pub fn new(max_size: usize, default_ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_size,
            default_ttl,
        }
    }

    // == Get ==
    /// Retrieves a value by key and marks it most recently used.
    ///
    /// A hit also restarts the entry's TTL. Expired entries that the sweeper
    /// has not reached yet are still returned.
    pub fn get<Q>(&mut self, key: &Q, now: Instant) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.entries.get_mut(key) {
            Some(entry) => {
                self.lru.move_to_front(entry.slot);
                entry.refresh(self.default_ttl, now);
                self.stats.record_hit();
                Some(&entry.value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Retrieves a value without touching recency, TTL or statistics.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|entry| &entry.value)
    }

    // == Set ==
    /// Stores a key-value pair.
    ///
    /// If the key already exists, the value is overwritten, the TTL restarts
    /// and the entry becomes most recently used. If inserting a new key pushes
    /// the count past `max_size`, the least recently used entry is evicted.
    ///
    /// # Returns
    /// The key evicted to make room, if any.
    pub fn set(&mut self, key: K, value: V, now: Instant) -> Option<K> {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = value;
            entry.refresh(self.default_ttl, now);
            self.lru.move_to_front(entry.slot);
            return None;
        }

        let slot = self.lru.push_front(key.clone());
        self.entries
            .insert(key, CacheEntry::new(value, self.default_ttl, slot, now));

        if self.entries.len() > self.max_size {
            self.evict_oldest()
        } else {
            None
        }
    }

    // == Remove ==
    /// Removes an entry by key, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove(key)?;
        self.lru.remove(entry.slot);
        self.stats.record_deletion();
        Some(entry.value)
    }

    // == Clear ==
    /// Drops every entry. Returns the number of entries discarded.
    pub fn clear(&mut self) -> usize {
        let cleared = self.entries.len();
        self.entries = HashMap::new();
        self.lru.clear();
        cleared
    }

    // == Remove Expired ==
    /// Removes all entries whose expiration instant is at or before `now`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let lru = &mut self.lru;

        self.entries.retain(|_, entry| {
            if entry.is_expired(now) {
                lru.remove(entry.slot);
                false
            } else {
                true
            }
        });

        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        removed
    }

    // == TTL Remaining ==
    /// Remaining lifetime of `key`, or None if absent or never expiring.
    pub fn ttl_remaining<Q>(&self, key: &Q, now: Instant) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)?.ttl_remaining(now)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_oldest(&mut self) -> Option<K> {
        let evicted = self.lru.pop_back()?;
        self.entries.remove(&evicted);
        self.stats.record_eviction();
        debug!(max_size = self.max_size, "evicted least recently used entry");
        Some(evicted)
    }

    /// Keys from most to least recently used.
    #[cfg(test)]
    pub(crate) fn recency_order(&self) -> Vec<K> {
        self.lru.iter().cloned().collect()
    }

    /// Panics if the map and the recency list have diverged.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self)
    where
        K: std::fmt::Debug,
    {
        self.lru.assert_links();
        assert_eq!(self.entries.len(), self.lru.len(), "map and list sizes differ");
        for (key, entry) in &self.entries {
            assert_eq!(
                self.lru.key_at(entry.slot),
                Some(key),
                "entry {:?} points at a foreign slot",
                key
            );
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Option<Duration> = Some(Duration::from_secs(300));

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_store_new() {
        let store: CacheStore<String, String> = CacheStore::new(100, TTL);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        store.assert_consistent();
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(100, TTL);
        let now = Instant::now();

        store.set("key1".to_string(), "value1".to_string(), now);
        let value = store.get("key1", now).cloned();

        assert_eq!(value.as_deref(), Some("value1"));
        assert_eq!(store.len(), 1);
        store.assert_consistent();
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store: CacheStore<String, String> = CacheStore::new(100, TTL);

        assert!(store.get("nonexistent", Instant::now()).is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_remove() {
        let mut store = CacheStore::new(100, TTL);
        let now = Instant::now();

        store.set("key1".to_string(), "value1".to_string(), now);
        assert_eq!(store.remove("key1").as_deref(), Some("value1"));

        assert!(store.is_empty());
        assert!(store.get("key1", now).is_none());
        store.assert_consistent();
    }

    #[test]
    fn test_store_remove_nonexistent() {
        let mut store: CacheStore<String, String> = CacheStore::new(100, TTL);

        assert!(store.remove("nonexistent").is_none());
        assert_eq!(store.stats().deletions, 0);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = CacheStore::new(100, TTL);
        let now = Instant::now();

        store.set("key1".to_string(), "value1".to_string(), now);
        store.set("key1".to_string(), "value2".to_string(), now);

        assert_eq!(store.get("key1", now).map(String::as_str), Some("value2"));
        assert_eq!(store.len(), 1);
        store.assert_consistent();
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = CacheStore::new(3, TTL);
        let now = Instant::now();

        store.set("key1", 1, now);
        store.set("key2", 2, now);
        store.set("key3", 3, now);

        // Cache is full, adding key4 should evict key1 (oldest)
        let evicted = store.set("key4", 4, now);

        assert_eq!(evicted, Some("key1"));
        assert_eq!(store.len(), 3);
        assert!(store.get("key1", now).is_none());
        assert!(store.get("key2", now).is_some());
        assert!(store.get("key3", now).is_some());
        assert!(store.get("key4", now).is_some());
        assert_eq!(store.stats().evictions, 1);
        store.assert_consistent();
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = CacheStore::new(2, None);
        let now = Instant::now();

        store.set(1, 1, now);
        store.set(2, 2, now);
        store.get(&1, now);
        let evicted = store.set(3, 3, now);

        assert_eq!(evicted, Some(2));
        assert_eq!(store.get(&1, now), Some(&1));
        assert_eq!(store.get(&3, now), Some(&3));
        store.assert_consistent();
    }

    #[test]
    fn test_store_lru_touch_on_overwrite() {
        let mut store = CacheStore::new(2, None);
        let now = Instant::now();

        store.set(1, 1, now);
        store.set(2, 2, now);
        store.set(1, 5, now);
        let evicted = store.set(3, 3, now);

        assert_eq!(evicted, Some(2));
        assert_eq!(store.get(&1, now), Some(&5));
        assert_eq!(store.get(&3, now), Some(&3));
        store.assert_consistent();
    }

    #[test]
    fn test_store_peek_does_not_touch() {
        let mut store = CacheStore::new(2, None);
        let now = Instant::now();

        store.set(1, "one", now);
        store.set(2, "two", now);

        assert_eq!(store.peek(&1), Some(&"one"));
        assert_eq!(store.set(3, "three", now), Some(1));
        assert_eq!(store.stats().hits, 0);
    }

    #[test]
    fn test_store_zero_capacity_evicts_immediately() {
        let mut store = CacheStore::new(0, None);
        let now = Instant::now();

        assert_eq!(store.set("a", 1, now), Some("a"));
        assert!(store.is_empty());
        store.assert_consistent();
    }

    #[test]
    fn test_store_get_does_not_expire() {
        let mut store = CacheStore::new(10, Some(ms(25)));
        let start = Instant::now();

        store.set("stale", 1, start);

        // Past the TTL but not swept yet: still served
        assert_eq!(store.get("stale", start + ms(40)), Some(&1));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_refreshes_ttl() {
        let mut store = CacheStore::new(10, Some(ms(25)));
        let start = Instant::now();

        store.set("touched", 1, start);
        store.set("idle", 2, start);
        store.get("touched", start + ms(20));

        assert_eq!(store.remove_expired(start + ms(30)), 1);
        assert!(store.peek("touched").is_some());
        assert!(store.peek("idle").is_none());
        assert_eq!(store.ttl_remaining("touched", start + ms(30)), Some(ms(15)));
        store.assert_consistent();
    }

    #[test]
    fn test_store_remove_expired() {
        let mut store = CacheStore::new(100, Some(ms(25)));
        let start = Instant::now();

        store.set("key1", 1, start);
        store.set("key2", 2, start + ms(10));

        assert_eq!(store.remove_expired(start + ms(20)), 0);
        assert_eq!(store.remove_expired(start + ms(25)), 1);
        assert_eq!(store.len(), 1);
        assert!(store.peek("key2").is_some());

        assert_eq!(store.remove_expired(start + ms(40)), 1);
        assert!(store.is_empty());
        assert_eq!(store.stats().expirations, 2);
        store.assert_consistent();
    }

    #[test]
    fn test_store_no_ttl_never_expires() {
        let mut store = CacheStore::new(100, None);
        let start = Instant::now();

        store.set("forever", 1, start);

        assert_eq!(store.remove_expired(start + Duration::from_secs(86_400)), 0);
        assert!(store.ttl_remaining("forever", start).is_none());
    }

    #[test]
    fn test_store_clear() {
        let mut store = CacheStore::new(100, TTL);
        let now = Instant::now();

        store.set("a", 1, now);
        store.set("b", 2, now);

        assert_eq!(store.clear(), 2);
        assert_eq!(store.len(), 0);
        assert_eq!(store.clear(), 0);
        store.assert_consistent();

        store.set("c", 3, now);
        assert_eq!(store.recency_order(), vec!["c"]);
        store.assert_consistent();
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new(100, TTL);
        let now = Instant::now();

        store.set("key1", 1, now);
        store.get("key1", now); // hit
        store.get("nonexistent", now); // miss
        store.remove("key1");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.deletions, 1);
        assert_eq!(stats.total_entries, 0);
    }
}
