//! Cache Facade
//!
//! The public, concurrency-safe surface of the cache. A single `RwLock`
//! guards the store; the expiry sweeper shares that lock through an `Arc`.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::cache::{CacheStats, CacheStore, EvictionPolicy};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweeper, Sweeper};

// == Cacher ==
/// Thread-safe in-memory cache with TTL expiry and a configurable eviction
/// policy.
///
/// `get` mutates access metadata and therefore takes the write lock like
/// every other mutating operation; only pure observers share the read lock.
///
/// Each cache spawns its own background sweeper. Call [`Cacher::close`] to
/// stop it deterministically; dropping the cache also signals it to stop.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use cacher::{Cacher, EvictionPolicy};
///
/// #[tokio::main]
/// async fn main() {
///     let cache = Cacher::new(2, Duration::from_secs(60), EvictionPolicy::Lru);
///
///     cache.set("k1", 1, Duration::from_secs(5)).await;
///     assert_eq!(cache.get(&"k1").await, Ok(1));
///
///     cache.close().await;
/// }
/// ```
pub struct Cacher<K, V> {
    store: Arc<RwLock<CacheStore<K, V>>>,
    sweeper: Mutex<Sweeper>,
}

impl<K, V> Cacher<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache and starts its expiry sweeper.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries, 0 = unlimited
    /// * `clearing_interval` - Sweep period, 0 = the 100 second default
    /// * `eviction_policy` - Victim selection when capacity is reached
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime.
    pub fn new(capacity: usize, clearing_interval: Duration, eviction_policy: EvictionPolicy) -> Self {
        Self::with_config(
            CacheConfig::default()
                .with_capacity(capacity)
                .with_clearing_interval(clearing_interval)
                .with_eviction_policy(eviction_policy),
        )
    }

    /// Creates a cache from a full configuration and starts its sweeper.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime. The cache needs a runtime
    /// to spawn its background sweeper; use [`Cacher::try_with_config`] to
    /// get an error instead.
    pub fn with_config(config: CacheConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(cache) => cache,
            Err(_) => panic!(
                "cacher::Cacher requires a Tokio runtime. \
                 Create it from within a #[tokio::main] or #[tokio::test] context, \
                 or from code running on a Tokio runtime."
            ),
        }
    }

    /// Like [`Cacher::new`], but reports a missing runtime as an error.
    pub fn try_new(
        capacity: usize,
        clearing_interval: Duration,
        eviction_policy: EvictionPolicy,
    ) -> Result<Self> {
        Self::try_with_config(
            CacheConfig::default()
                .with_capacity(capacity)
                .with_clearing_interval(clearing_interval)
                .with_eviction_policy(eviction_policy),
        )
    }

    /// Creates a cache from a full configuration, failing with
    /// `RuntimeUnavailable` when called outside of a Tokio runtime.
    pub fn try_with_config(config: CacheConfig) -> Result<Self> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(CacheError::RuntimeUnavailable);
        }

        let store = Arc::new(RwLock::new(CacheStore::new(&config)));
        let sweeper = spawn_sweeper(store.clone(), config.effective_clearing_interval());

        info!(
            capacity = config.capacity,
            policy = %config.eviction_policy,
            "Cache created"
        );

        Ok(Self {
            store,
            sweeper: Mutex::new(sweeper),
        })
    }

    // == Entry Operations ==
    /// Retrieves a value, failing with `NotFound` if absent or expired.
    pub async fn get(&self, key: &K) -> Result<V> {
        self.store.write().await.get(key)
    }

    /// Stores a value with a TTL (`Duration::ZERO` = never expires).
    ///
    /// Evicts one entry first whenever the cache is at capacity.
    pub async fn set(&self, key: K, value: V, ttl: Duration) {
        self.store.write().await.set(key, value, ttl);
    }

    /// Removes a key, failing with `NotFound` if it is absent.
    pub async fn delete(&self, key: &K) -> Result<()> {
        self.store.write().await.delete(key)
    }

    /// Removes every entry.
    pub async fn clear(&self) {
        self.store.write().await.clear();
        info!("Cache cleared");
    }

    /// Returns all live keys, or `EmptyCache` when there are none.
    pub async fn keys(&self) -> Result<Vec<K>> {
        self.store.read().await.keys()
    }

    /// Returns all live values; empty when the cache is empty.
    pub async fn get_all(&self) -> Vec<V> {
        self.store.read().await.values()
    }

    /// Replaces a key's TTL without resetting its access clock.
    pub async fn set_ttl(&self, key: &K, ttl: Duration) -> Result<()> {
        self.store.write().await.set_ttl(key, ttl)
    }

    /// Returns a key's configured TTL.
    pub async fn ttl(&self, key: &K) -> Result<Duration> {
        self.store.read().await.ttl(key)
    }

    /// Returns a key's access counter.
    pub async fn counter(&self, key: &K) -> Result<u64> {
        self.store.read().await.counter(key)
    }

    // == Reconfiguration ==
    /// Changes the capacity (0 = unlimited).
    ///
    /// Accepts any integer; values that are not a valid entry count (such as
    /// negative numbers) fail with `InvalidCapacity`. The cache is not shrunk
    /// eagerly: subsequent inserts evict one entry each.
    pub async fn set_capacity<C>(&self, capacity: C) -> Result<()>
    where
        C: TryInto<usize> + Display + Copy,
    {
        let capacity: usize = capacity
            .try_into()
            .map_err(|_| CacheError::InvalidCapacity(capacity.to_string()))?;

        self.store.write().await.set_capacity(capacity);
        info!(capacity = capacity, "Cache capacity updated");
        Ok(())
    }

    /// Returns the current capacity (0 = unlimited).
    pub async fn capacity(&self) -> usize {
        self.store.read().await.capacity()
    }

    /// Changes the eviction policy for subsequent evictions.
    ///
    /// Accepts an [`EvictionPolicy`], a numeric code (0-3) or a policy name;
    /// anything else fails with `InvalidPolicy`.
    pub async fn set_eviction_policy<P>(&self, policy: P) -> Result<()>
    where
        P: TryInto<EvictionPolicy> + Display + Copy,
    {
        let policy: EvictionPolicy = policy
            .try_into()
            .map_err(|_| CacheError::InvalidPolicy(policy.to_string()))?;

        self.store.write().await.set_eviction_policy(policy);
        info!(%policy, "Eviction policy updated");
        Ok(())
    }

    /// Returns the current eviction policy.
    pub async fn eviction_policy(&self) -> EvictionPolicy {
        self.store.read().await.eviction_policy()
    }

    // == Diagnostics ==
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Runs one expiry sweep immediately and returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    /// Checks that the entry table and the recency index agree.
    pub async fn is_consistent(&self) -> bool {
        self.store.read().await.is_consistent()
    }

    // == Close ==
    /// Stops the background sweeper and waits for it to finish.
    ///
    /// The cache stays usable afterwards; expired entries are still purged
    /// when read.
    pub async fn close(&self) {
        self.sweeper.lock().await.stop().await;
        info!("Cache closed");
    }

    /// Returns true until [`Cacher::close`] has stopped the sweeper.
    pub async fn is_sweeping(&self) -> bool {
        self.sweeper.lock().await.is_running()
    }
}

impl<K, V> Cacher<K, V>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Debug + Send + Sync + 'static,
{
    /// Returns a diagnostic snapshot; renders as a text report via `Display`.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }
}

impl<K, V> fmt::Debug for Cacher<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cacher").finish_non_exhaustive()
    }
}
