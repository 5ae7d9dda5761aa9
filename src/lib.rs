//! LRU TTL Cache - An embeddable in-memory key/value cache
//!
//! Bounds memory with least-recently-used eviction and enforces freshness with
//! a per-entry TTL that a background sweeper reclaims.

mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{CacheStats, LruTtlCache};
pub use config::{CacheConfig, DeleteCallback};
pub use error::{CacheError, Result};
