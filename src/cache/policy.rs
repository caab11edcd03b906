//! Eviction Policy Module
//!
//! Pure victim selection. Given the entry table and the recency index, each
//! policy names the key that should make room for a new insert; removal is
//! left to the caller.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use rand::seq::IteratorRandom;
use rand::Rng;
use serde::Serialize;

use crate::cache::{EntryTable, RecencyIndex};
use crate::error::CacheError;

// == Eviction Policy ==
/// Strategy used to pick a victim when the cache is at capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvictionPolicy {
    /// Least recently used: back of the recency index
    #[default]
    Lru,
    /// Most recently used: front of the recency index
    Mru,
    /// Least frequently used: minimum access counter
    Lfu,
    /// Uniformly random live key
    Random,
}

impl EvictionPolicy {
    /// All recognized policies, in code order.
    pub const ALL: [EvictionPolicy; 4] = [
        EvictionPolicy::Lru,
        EvictionPolicy::Mru,
        EvictionPolicy::Lfu,
        EvictionPolicy::Random,
    ];

    /// Returns the canonical upper-case policy name.
    pub fn name(self) -> &'static str {
        match self {
            EvictionPolicy::Lru => "LRU",
            EvictionPolicy::Mru => "MRU",
            EvictionPolicy::Lfu => "LFU",
            EvictionPolicy::Random => "RANDOM",
        }
    }

    // == Select Victim ==
    /// Chooses the key to evict, or `None` if the cache is empty.
    ///
    /// LFU walks the recency index from its least recently touched end, so
    /// among equal counters the least recently used key loses. RANDOM draws
    /// one index uniformly over the same deterministic ordering, which makes
    /// a seeded `rng` fully reproducible.
    pub fn select_victim<K, V, R>(
        self,
        table: &EntryTable<K, V>,
        recency: &RecencyIndex<K>,
        rng: &mut R,
    ) -> Option<K>
    where
        K: Hash + Eq + Clone,
        R: Rng + ?Sized,
    {
        match self {
            EvictionPolicy::Lru => recency.back().cloned(),
            EvictionPolicy::Mru => recency.front().cloned(),
            EvictionPolicy::Lfu => recency
                .iter()
                .rev()
                .filter_map(|key| table.lookup(key).map(|entry| (key, entry.access_count)))
                .min_by_key(|(_, count)| *count)
                .map(|(key, _)| key.clone()),
            EvictionPolicy::Random => recency.iter().choose(rng).cloned(),
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// == Conversions ==
impl TryFrom<i32> for EvictionPolicy {
    type Error = CacheError;

    /// Maps the numeric codes 0=LRU, 1=MRU, 2=LFU, 3=RANDOM.
    fn try_from(code: i32) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or_else(|| CacheError::InvalidPolicy(code.to_string()))
    }
}

impl FromStr for EvictionPolicy {
    type Err = CacheError;

    /// Accepts a policy name (case-insensitive) or its numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i32>() {
            return Self::try_from(code);
        }
        Self::ALL
            .into_iter()
            .find(|policy| policy.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CacheError::InvalidPolicy(s.to_string()))
    }
}

impl TryFrom<&str> for EvictionPolicy {
    type Error = CacheError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}
