//! Cache Store Module
//!
//! Main cache engine combining the entry table, the recency index and the
//! eviction policy. Every method assumes the caller already holds exclusive
//! access; the async facade wraps a store in a single `RwLock`.

use std::fmt::Debug;
use std::hash::Hash;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::cache::{
    CacheMetrics, CacheStats, EntrySnapshot, EntryTable, EvictionPolicy, RecencyIndex,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Cache state: entries, recency order, configuration and counters.
///
/// Invariant: the key sets of `table` and `recency` are always equal.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    table: EntryTable<K, V>,
    recency: RecencyIndex<K>,
    /// Maximum number of entries, 0 = unlimited
    capacity: usize,
    policy: EvictionPolicy,
    clearing_interval: Duration,
    rng: StdRng,
    metrics: CacheMetrics,
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty store from the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            table: EntryTable::new(),
            recency: RecencyIndex::new(),
            capacity: config.capacity,
            policy: config.eviction_policy,
            clearing_interval: config.effective_clearing_interval(),
            rng,
            metrics: CacheMetrics::new(),
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// An expired entry is removed and reported exactly like an absent one.
    /// On success the access counter is bumped and the key becomes the most
    /// recently used.
    pub fn get(&mut self, key: &K) -> Result<V> {
        let expired = match self.table.lookup(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.metrics.record_miss();
                return Err(CacheError::NotFound);
            }
        };

        if expired {
            self.remove_key(key);
            self.metrics.record_expirations(1);
            self.metrics.record_miss();
            debug!("Expired entry removed on read");
            return Err(CacheError::NotFound);
        }

        let value = match self.table.touch(key) {
            Some(entry) => entry.value.clone(),
            None => return Err(CacheError::NotFound),
        };
        self.recency.move_to_front(key);
        self.metrics.record_hit();
        Ok(value)
    }

    // == Set ==
    /// Stores a key-value pair with a TTL (`Duration::ZERO` = never expires).
    ///
    /// If the cache is at or above capacity, exactly one entry is evicted
    /// first according to the current policy, even when `key` is already
    /// live. An existing key is overwritten with a fresh counter and
    /// timestamp.
    pub fn set(&mut self, key: K, value: V, ttl: Duration) {
        if self.capacity > 0 && self.table.len() >= self.capacity {
            self.evict();
        }

        self.table.insert(key.clone(), value, ttl);
        self.recency.push_front(key);
    }

    // == Delete ==
    /// Removes an entry by key.
    pub fn delete(&mut self, key: &K) -> Result<()> {
        if self.remove_key(key) {
            Ok(())
        } else {
            Err(CacheError::NotFound)
        }
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.table.clear();
        self.recency.clear();
    }

    // == Keys ==
    /// Returns all live keys in unspecified order.
    ///
    /// An empty cache is reported as `EmptyCache` rather than an empty list.
    pub fn keys(&self) -> Result<Vec<K>> {
        if self.table.is_empty() {
            return Err(CacheError::EmptyCache);
        }
        Ok(self.table.all_keys().cloned().collect())
    }

    // == Values ==
    /// Returns all live values in unspecified order.
    pub fn values(&self) -> Vec<V> {
        self.table.all_values().cloned().collect()
    }

    // == TTL ==
    /// Replaces the TTL of a key without resetting its access clock.
    pub fn set_ttl(&mut self, key: &K, ttl: Duration) -> Result<()> {
        if self.table.set_ttl(key, ttl) {
            Ok(())
        } else {
            Err(CacheError::NotFound)
        }
    }

    /// Returns the configured TTL of a key.
    pub fn ttl(&self, key: &K) -> Result<Duration> {
        self.table
            .lookup(key)
            .map(|entry| entry.ttl)
            .ok_or(CacheError::NotFound)
    }

    // == Counter ==
    /// Returns the access counter of a key.
    pub fn counter(&self, key: &K) -> Result<u64> {
        self.table
            .lookup(key)
            .map(|entry| entry.access_count)
            .ok_or(CacheError::NotFound)
    }

    // == Configuration ==
    /// Updates capacity; enforcement happens lazily on the next insert.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Switches policy; existing ordering is kept as-is.
    pub fn set_eviction_policy(&mut self, policy: EvictionPolicy) {
        self.policy = policy;
    }

    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn clearing_interval(&self) -> Duration {
        self.clearing_interval
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.metrics
    }

    // == Evict ==
    /// Removes one entry chosen by the current policy.
    ///
    /// Returns the evicted key, or `None` if the cache was empty.
    pub fn evict(&mut self) -> Option<K> {
        let victim = self
            .policy
            .select_victim(&self.table, &self.recency, &mut self.rng)?;
        self.remove_key(&victim);
        self.metrics.record_eviction();
        debug!(policy = %self.policy, "Evicted entry to make room");
        Some(victim)
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<K> = self
            .table
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in &expired_keys {
            self.remove_key(key);
        }

        self.metrics.record_expirations(count);
        count
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Checks that the entry table and the recency index hold the same keys.
    pub fn is_consistent(&self) -> bool {
        self.table.len() == self.recency.len()
            && self.recency.iter().all(|key| self.table.contains(key))
    }

    fn remove_key(&mut self, key: &K) -> bool {
        self.recency.remove(key);
        self.table.remove(key).is_some()
    }
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone + Debug,
{
    // == Stats ==
    /// Builds a diagnostic snapshot without touching any entry.
    pub fn stats(&self) -> CacheStats {
        let items = self.table.len();
        let entries = self
            .table
            .iter()
            .map(|(key, entry)| EntrySnapshot {
                key: format!("{:?}", key),
                value: format!("{:?}", entry.value),
                ttl: entry.ttl,
                counter: entry.access_count,
                last_used: entry.last_access_at,
            })
            .collect();

        CacheStats {
            eviction_policy: self.policy,
            capacity: (self.capacity > 0).then_some(self.capacity),
            clearing_interval: self.clearing_interval,
            items,
            occupancy: CacheStats::occupancy_percent(items, self.capacity),
            metrics: self.metrics,
            hit_rate: self.metrics.hit_rate(),
            entries,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const LONG_TTL: Duration = Duration::from_secs(300);

    fn store_with(capacity: usize, policy: EvictionPolicy) -> CacheStore<String, String> {
        let config = CacheConfig::default()
            .with_capacity(capacity)
            .with_eviction_policy(policy)
            .with_seed(1);
        CacheStore::new(&config)
    }

    fn set(store: &mut CacheStore<String, String>, key: &str) {
        store.set(key.to_string(), format!("value_{}", key), LONG_TTL);
    }

    fn has(store: &mut CacheStore<String, String>, key: &str) -> bool {
        store.get(&key.to_string()).is_ok()
    }

    #[test]
    fn test_store_new() {
        let store = store_with(100, EvictionPolicy::Lru);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.clearing_interval(), Duration::from_secs(100));
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store_with(100, EvictionPolicy::Lru);

        set(&mut store, "key1");
        let value = store.get(&"key1".to_string()).unwrap();

        assert_eq!(value, "value_key1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store_with(100, EvictionPolicy::Lru);

        let result = store.get(&"nonexistent".to_string());
        assert_eq!(result, Err(CacheError::NotFound));
    }

    #[test]
    fn test_store_delete() {
        let mut store = store_with(100, EvictionPolicy::Lru);

        set(&mut store, "key1");
        store.delete(&"key1".to_string()).unwrap();

        assert!(store.is_empty());
        assert!(store.is_consistent());
        assert_eq!(store.get(&"key1".to_string()), Err(CacheError::NotFound));
        assert_eq!(store.delete(&"key1".to_string()), Err(CacheError::NotFound));
    }

    #[test]
    fn test_store_overwrite_resets_counter() {
        let mut store = store_with(100, EvictionPolicy::Lru);
        let key = "key1".to_string();

        store.set(key.clone(), "value1".to_string(), LONG_TTL);
        store.get(&key).unwrap();
        store.set(key.clone(), "value2".to_string(), Duration::from_secs(7));

        assert_eq!(store.counter(&key), Ok(1));
        assert_eq!(store.ttl(&key), Ok(Duration::from_secs(7)));
        assert_eq!(store.get(&key).unwrap(), "value2");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite_at_capacity_evicts_once() {
        let mut store = store_with(2, EvictionPolicy::Mru);

        set(&mut store, "k1");
        set(&mut store, "k2");
        set(&mut store, "k1");

        // k2 was the most recent key when k1 was rewritten
        assert_eq!(store.metrics().evictions, 1);
        assert_eq!(store.len(), 1);
        assert!(store.is_consistent());
        assert!(has(&mut store, "k1"));
        assert!(!has(&mut store, "k2"));
    }

    #[test]
    fn test_store_overwrite_of_victim_at_capacity() {
        let mut store = store_with(2, EvictionPolicy::Lru);

        set(&mut store, "k1");
        set(&mut store, "k2");
        set(&mut store, "k1");

        // k1 is evicted as the LRU key, then written back as new
        assert_eq!(store.metrics().evictions, 1);
        assert_eq!(store.len(), 2);
        assert!(store.is_consistent());
        assert_eq!(store.counter(&"k1".to_string()), Ok(1));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store_with(100, EvictionPolicy::Lru);
        let key = "key1".to_string();

        store.set(key.clone(), "value1".to_string(), Duration::from_millis(30));
        assert!(store.get(&key).is_ok());

        sleep(Duration::from_millis(60));

        assert_eq!(store.get(&key), Err(CacheError::NotFound));
        assert!(store.is_empty());
        assert!(store.is_consistent());
        assert_eq!(store.metrics().expirations, 1);
    }

    #[test]
    fn test_store_get_extends_ttl() {
        let mut store = store_with(100, EvictionPolicy::Lru);
        let key = "key1".to_string();
        store.set(key.clone(), "v".to_string(), Duration::from_millis(80));

        sleep(Duration::from_millis(50));
        assert!(store.get(&key).is_ok());
        sleep(Duration::from_millis(50));

        assert!(store.get(&key).is_ok());
    }

    #[test]
    fn test_store_zero_ttl_never_expires() {
        let mut store = store_with(100, EvictionPolicy::Lru);
        store.set("key1".to_string(), "v".to_string(), Duration::ZERO);

        sleep(Duration::from_millis(20));

        assert_eq!(store.cleanup_expired(), 0);
        assert!(has(&mut store, "key1"));
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store_with(2, EvictionPolicy::Lru);

        set(&mut store, "k1");
        set(&mut store, "k2");
        assert!(has(&mut store, "k1"));
        set(&mut store, "k3");

        assert_eq!(store.len(), 2);
        assert!(!has(&mut store, "k2"));
        assert!(has(&mut store, "k1"));
        assert!(has(&mut store, "k3"));
    }

    #[test]
    fn test_store_mru_eviction() {
        let mut store = store_with(2, EvictionPolicy::Mru);

        set(&mut store, "k1");
        set(&mut store, "k2");
        set(&mut store, "k3");

        assert!(!has(&mut store, "k2"));
        assert!(has(&mut store, "k1"));
        assert!(has(&mut store, "k3"));
    }

    #[test]
    fn test_store_lfu_eviction() {
        let mut store = store_with(2, EvictionPolicy::Lfu);

        set(&mut store, "k1");
        set(&mut store, "k2");
        store.get(&"k1".to_string()).unwrap();
        store.get(&"k1".to_string()).unwrap();
        assert_eq!(store.counter(&"k1".to_string()), Ok(3));
        set(&mut store, "k3");

        assert!(!has(&mut store, "k2"));
        assert!(has(&mut store, "k1"));
        assert!(has(&mut store, "k3"));
    }

    #[test]
    fn test_store_random_eviction() {
        let mut store = store_with(2, EvictionPolicy::Random);

        set(&mut store, "k1");
        set(&mut store, "k2");
        set(&mut store, "k3");

        let k1 = has(&mut store, "k1");
        let k2 = has(&mut store, "k2");
        assert!(k1 ^ k2, "exactly one of k1/k2 should survive");
        assert!(has(&mut store, "k3"));
    }

    #[test]
    fn test_store_evict_empty_is_noop() {
        let mut store = store_with(2, EvictionPolicy::Lru);
        assert_eq!(store.evict(), None);
        assert_eq!(store.metrics().evictions, 0);
    }

    #[test]
    fn test_store_unlimited_capacity() {
        let mut store = store_with(0, EvictionPolicy::Lru);
        for i in 0..500 {
            set(&mut store, &format!("k{}", i));
        }
        assert_eq!(store.len(), 500);
    }

    #[test]
    fn test_store_shrink_capacity_is_lazy() {
        let mut store = store_with(4, EvictionPolicy::Lru);
        for key in ["a", "b", "c", "d"] {
            set(&mut store, key);
        }

        store.set_capacity(2);
        assert_eq!(store.len(), 4);

        // One eviction per insert, even when far over capacity
        set(&mut store, "e");
        assert_eq!(store.len(), 4);
        assert!(!has(&mut store, "a"));
    }

    #[test]
    fn test_store_policy_switch_applies_to_next_insert() {
        let mut store = store_with(2, EvictionPolicy::Lru);
        set(&mut store, "k1");
        set(&mut store, "k2");

        store.set_eviction_policy(EvictionPolicy::Mru);
        assert_eq!(store.eviction_policy(), EvictionPolicy::Mru);
        set(&mut store, "k3");

        assert!(has(&mut store, "k1"));
        assert!(!has(&mut store, "k2"));
    }

    #[test]
    fn test_store_keys_and_values() {
        let mut store = store_with(10, EvictionPolicy::Lru);
        assert_eq!(store.keys(), Err(CacheError::EmptyCache));
        assert!(store.values().is_empty());

        set(&mut store, "k1");
        set(&mut store, "k2");

        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["k1".to_string(), "k2".to_string()]);

        let mut values = store.values();
        values.sort();
        assert_eq!(values, vec!["value_k1".to_string(), "value_k2".to_string()]);
    }

    #[test]
    fn test_store_set_ttl_and_ttl() {
        let mut store = store_with(10, EvictionPolicy::Lru);
        let key = "k1".to_string();
        set(&mut store, "k1");

        store.set_ttl(&key, Duration::from_secs(10)).unwrap();
        assert_eq!(store.ttl(&key), Ok(Duration::from_secs(10)));

        let missing = "missing".to_string();
        assert_eq!(store.set_ttl(&missing, Duration::ZERO), Err(CacheError::NotFound));
        assert_eq!(store.ttl(&missing), Err(CacheError::NotFound));
        assert_eq!(store.counter(&missing), Err(CacheError::NotFound));
    }

    #[test]
    fn test_store_ttl_does_not_check_expiry() {
        let mut store = store_with(10, EvictionPolicy::Lru);
        let key = "k1".to_string();
        store.set(key.clone(), "v".to_string(), Duration::from_millis(10));

        sleep(Duration::from_millis(30));

        // Introspection reports the stale entry; only reads and sweeps purge it
        assert_eq!(store.ttl(&key), Ok(Duration::from_millis(10)));
        assert_eq!(store.counter(&key), Ok(1));
        assert_eq!(store.get(&key), Err(CacheError::NotFound));
    }

    #[test]
    fn test_store_clear() {
        let mut store = store_with(10, EvictionPolicy::Lru);
        set(&mut store, "k1");
        set(&mut store, "k2");

        store.clear();

        assert!(store.is_empty());
        assert!(store.is_consistent());
        assert!(!has(&mut store, "k1"));
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store_with(100, EvictionPolicy::Lru);

        store.set("key1".to_string(), "value1".to_string(), Duration::from_millis(20));
        store.set("key2".to_string(), "value2".to_string(), Duration::from_secs(10));

        sleep(Duration::from_millis(50));

        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.is_consistent());
        assert!(has(&mut store, "key2"));
    }

    #[test]
    fn test_store_stats() {
        let mut store = store_with(100, EvictionPolicy::Lru);

        set(&mut store, "k1");
        set(&mut store, "k2");
        store.get(&"k1".to_string()).unwrap();
        let _ = store.get(&"nonexistent".to_string());

        let stats = store.stats();
        assert_eq!(stats.eviction_policy, EvictionPolicy::Lru);
        assert_eq!(stats.capacity, Some(100));
        assert_eq!(stats.items, 2);
        assert_eq!(stats.occupancy, 2.0);
        assert_eq!(stats.metrics.hits, 1);
        assert_eq!(stats.metrics.misses, 1);
        assert_eq!(stats.hit_rate, 0.5);
        assert_eq!(stats.entries.len(), 2);

        let report = stats.to_string();
        assert!(report.contains("Key: \"k1\" Value: \"value_k1\""));
        assert!(report.contains("Counter: 2"));
    }

    #[test]
    fn test_store_stats_does_not_mutate() {
        let mut store = store_with(0, EvictionPolicy::Lfu);
        set(&mut store, "k1");
        let key = "k1".to_string();

        let _ = store.stats();
        let _ = store.stats();

        assert_eq!(store.counter(&key), Ok(1));
        assert_eq!(store.stats().capacity, None);
        assert_eq!(store.stats().occupancy, 0.0);
    }
}
