//! Shared Cache Handle
//!
//! Thread-safe front end over [`CacheStore`]: one mutex guards the map and the
//! recency list, and an optional background sweeper enforces TTL.

use std::borrow::Borrow;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::cache::{CacheStats, CacheStore};
use crate::config::{CacheConfig, DeleteCallback};
use crate::error::Result;
use crate::tasks::{spawn_sweeper, SweeperHandle};

struct Inner<K, V> {
    store: Mutex<CacheStore<K, V>>,
    on_delete: Option<DeleteCallback>,
    /// Held across the whole of `shutdown`; dropped with the last cache handle
    sweeper: AsyncMutex<Option<SweeperHandle>>,
}

impl<K, V> Inner<K, V>
where
    K: Hash + Eq + Clone,
{
    fn lock_store(&self) -> MutexGuard<'_, CacheStore<K, V>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify_deleted(&self, count: usize) {
        if let Some(callback) = &self.on_delete {
            callback(count);
        }
    }

    fn sweep(&self) {
        let removed = self.lock_store().remove_expired(Instant::now());

        if removed > 0 {
            info!(removed, "TTL sweep removed expired entries");
        } else {
            debug!("TTL sweep found no expired entries");
        }

        // A panicking callback must not take the sweeper down with it
        if let Some(callback) = &self.on_delete {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(removed))).is_err() {
                error!(removed, "delete callback panicked during TTL sweep");
            }
        }
    }
}

// == LRU TTL Cache ==
/// In-memory cache bounded by entry count (LRU) and by entry age (TTL).
///
/// Cloning is cheap and every clone refers to the same cache. All operations
/// are internally synchronized; callers never need an outer lock.
///
/// When a TTL is configured, a sweeper task runs on the tokio runtime that was
/// current at construction. It stops on [`shutdown`](Self::shutdown) or once
/// the last clone is dropped.
///
/// ```
/// use lru_ttl_cache::{CacheConfig, LruTtlCache};
///
/// let cache = LruTtlCache::new(CacheConfig::default().with_max_size(2)).unwrap();
/// cache.set("a", 1);
/// cache.set("b", 2);
/// cache.get("a");
/// cache.set("c", 3);
///
/// assert_eq!(cache.get("b"), None);
/// assert_eq!(cache.get("a"), Some(1));
/// ```
pub struct LruTtlCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for LruTtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> LruTtlCache<K, V>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + 'static,
{
    // == Constructor ==
    /// Builds a cache from `config`.
    ///
    /// # Errors
    /// - [`CacheError::InvalidConfig`](crate::CacheError::InvalidConfig) for a
    ///   zero `max_size`, or a zero `clean_interval` with TTL enabled
    /// - [`CacheError::NoRuntime`](crate::CacheError::NoRuntime) if TTL is
    ///   enabled outside a tokio runtime
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let runtime = match config.default_ttl {
            Some(_) => Some(Handle::try_current()?),
            None => None,
        };

        let inner = Arc::new_cyclic(|weak| Inner {
            store: Mutex::new(CacheStore::new(config.max_size, config.default_ttl)),
            on_delete: config.on_delete.clone(),
            sweeper: AsyncMutex::new(runtime.map(|runtime| {
                spawn_sweeper(&runtime, config.clean_interval, sweep_task(weak.clone()))
            })),
        });

        debug!(?config, "cache created");
        Ok(Self { inner })
    }

    // == Get ==
    /// Returns a clone of the value for `key`, marking it most recently used
    /// and restarting its TTL.
    ///
    /// An entry past its TTL is still returned until a sweep removes it.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock_store().get(key, Instant::now()).cloned()
    }

    // == Peek ==
    /// Returns a clone of the value for `key` without touching its recency or TTL.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock_store().peek(key).cloned()
    }

    // == Set ==
    /// Inserts or overwrites `key`.
    ///
    /// Inserting past `max_size` evicts exactly one least recently used entry.
    /// Such evictions are not reported to the delete callback.
    pub fn set(&self, key: K, value: V) {
        self.inner.lock_store().set(key, value, Instant::now());
    }

    // == Delete ==
    /// Removes `key` and returns its value.
    ///
    /// The delete callback is invoked with 1, after the lock is released, only
    /// when something was removed.
    pub fn delete<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.inner.lock_store().remove(key);
        if removed.is_some() {
            self.inner.notify_deleted(1);
        }
        removed
    }

    // == Clear ==
    /// Discards every entry. The delete callback is not invoked.
    pub fn clear(&self) {
        let cleared = self.inner.lock_store().clear();
        debug!(cleared, "cache cleared");
    }

    // == Size ==
    /// Returns the current number of entries.
    pub fn size(&self) -> usize {
        self.inner.lock_store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock_store().is_empty()
    }

    /// Remaining lifetime of `key`; None if absent or TTL is disabled.
    pub fn ttl<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock_store().ttl_remaining(key, Instant::now())
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.lock_store().stats()
    }

    // == Shutdown ==
    /// Stops the TTL sweeper and waits for it to exit.
    ///
    /// Safe to call repeatedly and from any clone. Concurrent callers all
    /// return only once the sweeper has exited. The cache stays usable
    /// afterwards, but expired entries are no longer removed.
    pub async fn shutdown(&self) {
        let mut sweeper = self.inner.sweeper.lock().await;

        if let Some(handle) = sweeper.as_mut() {
            handle.stop().await;
        }
        *sweeper = None;
    }
}

/// Sweep closure holding only a weak reference, so the task never keeps the
/// cache alive on its own. Dropping the cache drops the sweeper handle, which
/// stops the task.
fn sweep_task<K, V>(inner: Weak<Inner<K, V>>) -> impl FnMut() + Send + 'static
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + 'static,
{
    move || {
        if let Some(inner) = inner.upgrade() {
            inner.sweep();
        }
    }
}
