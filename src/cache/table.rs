//! Entry Table Module
//!
//! Authoritative key -> entry mapping. Knows nothing about eviction policies
//! and never checks expiry on its own; callers decide what an expired entry
//! means while holding the cache lock.

use std::collections::hash_map::{self, HashMap};
use std::hash::Hash;
use std::time::Duration;

use crate::cache::CacheEntry;

// == Entry Table ==
#[derive(Debug)]
pub struct EntryTable<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K, V> Default for EntryTable<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq, V> EntryTable<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fresh entry, replacing any previous one for the key.
    ///
    /// Returns the replaced entry, if any.
    pub fn insert(&mut self, key: K, value: V, ttl: Duration) -> Option<CacheEntry<V>> {
        self.entries.insert(key, CacheEntry::new(value, ttl))
    }

    pub fn lookup(&self, key: &K) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    /// Records an access on the entry and returns it.
    pub fn touch(&mut self, key: &K) -> Option<&CacheEntry<V>> {
        let entry = self.entries.get_mut(key)?;
        entry.touch();
        Some(entry)
    }

    /// Replaces the TTL without resetting the access clock.
    pub fn set_ttl(&mut self, key: &K, ttl: Duration) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.ttl = ttl;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<CacheEntry<V>> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all_keys(&self) -> hash_map::Keys<'_, K, CacheEntry<V>> {
        self.entries.keys()
    }

    pub fn all_values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.values().map(|entry| &entry.value)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, K, CacheEntry<V>> {
        self.entries.iter()
    }
}
