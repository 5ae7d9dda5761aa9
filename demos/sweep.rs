//! Sweep Demo
//!
//! Fills a small cache, lets the TTL sweeper reclaim it and prints statistics.
//!
//! ```text
//! RUST_LOG=lru_ttl_cache=debug CACHE_DEFAULT_TTL_MS=200 cargo run --example sweep
//! ```

use std::time::Duration;

use lru_ttl_cache::{CacheConfig, LruTtlCache};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> lru_ttl_cache::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_ttl_cache=info,sweep=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = CacheConfig::from_env();
    if config.default_ttl.is_none() {
        config = config.with_default_ttl(Duration::from_millis(200));
    }
    let max_size = config.max_size.min(100);
    let clean_interval = config.clean_interval.min(Duration::from_millis(50));
    let config = config
        .with_max_size(max_size)
        .with_clean_interval(clean_interval)
        .with_delete_callback(|count| info!(count, "delete callback"));
    info!(?config, "configuration loaded");

    let cache = LruTtlCache::new(config)?;

    for i in 0..150u32 {
        cache.set(format!("key-{i}"), i);
    }
    cache.get("key-120");
    cache.delete("key-149");
    info!(size = cache.size(), "cache filled");

    tokio::time::sleep(Duration::from_millis(400)).await;
    info!(size = cache.size(), stats = ?cache.stats(), "after TTL sweep");

    cache.shutdown().await;
    info!("shutdown complete");
    Ok(())
}
