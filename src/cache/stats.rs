//! Cache Statistics Module
//!
//! Tracks operational counters and builds the diagnostic snapshot returned
//! by `stats()`.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::cache::EvictionPolicy;

// == Cache Metrics ==
/// Running counters kept alongside the cache state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheMetrics {
    /// Number of successful reads
    pub hits: u64,
    /// Number of failed reads (key absent or expired)
    pub misses: u64,
    /// Number of entries removed to make room for an insert
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expirations: u64,
}

impl CacheMetrics {
    // == Constructor ==
    /// Creates a new set of counters, all at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}

// == Entry Snapshot ==
/// One line of the per-entry listing.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySnapshot {
    /// Key rendered with its `Debug` form
    pub key: String,
    /// Value rendered with its `Debug` form
    pub value: String,
    pub ttl: Duration,
    pub counter: u64,
    pub last_used: DateTime<Utc>,
}

// == Cache Stats ==
/// Point-in-time diagnostic view of a cache.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub eviction_policy: EvictionPolicy,
    /// `None` = unlimited
    pub capacity: Option<usize>,
    pub clearing_interval: Duration,
    pub items: usize,
    /// `100 * items / capacity`, 0 when unlimited
    pub occupancy: f64,
    pub metrics: CacheMetrics,
    pub hit_rate: f64,
    pub entries: Vec<EntrySnapshot>,
}

impl CacheStats {
    /// Computes occupancy as a percentage of capacity.
    pub fn occupancy_percent(items: usize, capacity: usize) -> f64 {
        if capacity == 0 {
            0.0
        } else {
            (items as f64 * 100.0) / capacity as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "STATS")?;
        writeln!(f, "Eviction Policy: {}", self.eviction_policy)?;
        match self.capacity {
            Some(capacity) => writeln!(f, "Capacity: {}", capacity)?,
            None => writeln!(f, "Capacity: unlimited")?,
        }
        writeln!(f, "Clearing Interval: {:?}", self.clearing_interval)?;
        writeln!(f, "Items: {}", self.items)?;
        writeln!(f, "Occupancy: {:.2}%", self.occupancy)?;
        writeln!(
            f,
            "Hits: {} Misses: {} Evictions: {} Expirations: {}",
            self.metrics.hits, self.metrics.misses, self.metrics.evictions, self.metrics.expirations
        )?;
        writeln!(f, "Cache:")?;
        for entry in &self.entries {
            writeln!(
                f,
                "  Key: {} Value: {} TTL: {:?} Counter: {} Last Used: {}",
                entry.key,
                entry.value,
                entry.ttl,
                entry.counter,
                entry.last_used.to_rfc3339_opts(SecondsFormat::Millis, true)
            )?;
        }
        Ok(())
    }
}
