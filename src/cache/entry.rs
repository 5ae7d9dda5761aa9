//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Absolute expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
    /// Slot of this entry in the recency list
    pub(crate) slot: usize,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry linked to recency `slot`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Optional lifetime measured from `now`
    /// * `slot` - Recency list slot owned by this entry
    /// * `now` - Insertion instant
    pub fn new(value: V, ttl: Option<Duration>, slot: usize, now: Instant) -> Self {
        Self {
            value,
            expires_at: expiry_from(now, ttl),
            slot,
        }
    }

    // == Refresh ==
    /// Restarts the lifetime of the entry from `now`.
    pub fn refresh(&mut self, ttl: Option<Duration>, now: Instant) {
        self.expires_at = expiry_from(now, ttl);
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now` reaches its expiration instant, so a
    /// zero TTL is eligible for the very next sweep.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired but was not swept yet
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(now))
    }
}

/// Computes the expiration instant, treating overflow as "never".
fn expiry_from(now: Instant, ttl: Option<Duration>) -> Option<Instant> {
    ttl.and_then(|ttl| now.checked_add(ttl))
}
