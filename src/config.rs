//! Configuration Module
//!
//! Cache options with chained setters, plus loading from environment variables.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{CacheError, Result};

/// Callback receiving the number of entries removed by one delete or sweep.
pub type DeleteCallback = Arc<dyn Fn(usize) + Send + Sync>;

// == Defaults ==
/// Effectively unbounded entry count.
pub const DEFAULT_MAX_SIZE: usize = usize::MAX - 1;

/// Period between two TTL sweeps.
pub const DEFAULT_CLEAN_INTERVAL: Duration = Duration::from_secs(60);

/// Cache configuration parameters.
///
/// All values are optional; [`Default`] gives an unbounded cache without TTL.
///
/// ```
/// use std::time::Duration;
/// use lru_ttl_cache::CacheConfig;
///
/// let config = CacheConfig::default()
///     .with_max_size(1_000)
///     .with_default_ttl(Duration::from_secs(30))
///     .with_clean_interval(Duration::from_secs(5));
/// assert_eq!(config.max_size, 1_000);
/// ```
#[derive(Clone)]
pub struct CacheConfig {
    /// Entry count ceiling triggering LRU eviction
    pub max_size: usize,
    /// Lifetime granted on insert and touch, None disables expiry and the sweeper
    pub default_ttl: Option<Duration>,
    /// Period of the background TTL sweep
    pub clean_interval: Duration,
    /// Invoked with the count removed by `delete` (always 1) or by a sweep (0 or more)
    pub on_delete: Option<DeleteCallback>,
}

impl CacheConfig {
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Disables expiry; no sweeper will be started.
    pub fn without_ttl(mut self) -> Self {
        self.default_ttl = None;
        self
    }

    pub fn with_clean_interval(mut self, interval: Duration) -> Self {
        self.clean_interval = interval;
        self
    }

    pub fn with_delete_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.on_delete = Some(Arc::new(callback));
        self
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: unbounded)
    /// - `CACHE_DEFAULT_TTL_MS` - TTL in milliseconds, negative disables (default: disabled)
    /// - `CACHE_CLEAN_INTERVAL_MS` - Sweep period in milliseconds (default: 60000)
    ///
    /// Values that fail to parse fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size: env::var("CACHE_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_size),
            default_ttl: env::var("CACHE_DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .map(|ms| u64::try_from(ms).ok().map(Duration::from_millis))
                .unwrap_or(defaults.default_ttl),
            clean_interval: env::var("CACHE_CLEAN_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.clean_interval),
            on_delete: None,
        }
    }

    /// Rejects settings that would yield a degenerate cache.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be at least 1".to_string(),
            ));
        }
        if self.default_ttl.is_some() && self.clean_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "clean_interval must be non-zero when TTL is enabled".to_string(),
            ));
        }
        if self.default_ttl.is_some() && Instant::now().checked_add(self.clean_interval).is_none() {
            return Err(CacheError::InvalidConfig(format!(
                "clean_interval {:?} is too large to schedule",
                self.clean_interval
            )));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            default_ttl: None,
            clean_interval: DEFAULT_CLEAN_INTERVAL,
            on_delete: None,
        }
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("max_size", &self.max_size)
            .field("default_ttl", &self.default_ttl)
            .field("clean_interval", &self.clean_interval)
            .field("on_delete", &self.on_delete.is_some())
            .finish()
    }
}
