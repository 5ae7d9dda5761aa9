//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod shared;
mod stats;
mod store;


pub(crate) use entry::CacheEntry;
pub(crate) use lru::LruTracker;
pub(crate) use store::CacheStore;

// Re-export public types
pub use shared::LruTtlCache;
pub use stats::CacheStats;
