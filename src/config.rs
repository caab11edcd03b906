//! Configuration Module
//!
//! Handles building cache configuration in code or from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::EvictionPolicy;

/// Sweep period used when none (or zero) is configured.
pub const DEFAULT_CLEARING_INTERVAL: Duration = Duration::from_secs(100);

/// Cache configuration parameters.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use cacher::{CacheConfig, EvictionPolicy};
///
/// let config = CacheConfig::default()
///     .with_capacity(1000)
///     .with_clearing_interval(Duration::from_secs(30))
///     .with_eviction_policy(EvictionPolicy::Lfu);
/// assert_eq!(config.capacity, 1000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of entries, 0 = unlimited
    pub capacity: usize,
    /// Interval between background expiry sweeps
    pub clearing_interval: Duration,
    /// Victim selection strategy when capacity is reached
    pub eviction_policy: EvictionPolicy,
    /// Seed for the RANDOM policy, entropy-seeded when `None`
    pub seed: Option<u64>,
}

impl CacheConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum entries, 0 = unlimited (default: 0)
    /// - `CACHE_CLEARING_INTERVAL_SECS` - Sweep period in seconds (default: 100)
    /// - `CACHE_EVICTION_POLICY` - `LRU`, `MRU`, `LFU`, `RANDOM` or 0-3 (default: LRU)
    /// - `CACHE_RANDOM_SEED` - Seed for the RANDOM policy (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            clearing_interval: env::var("CACHE_CLEARING_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.clearing_interval),
            eviction_policy: env::var("CACHE_EVICTION_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.eviction_policy),
            seed: env::var("CACHE_RANDOM_SEED")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the sweep period. Zero falls back to the default at construction.
    pub fn with_clearing_interval(mut self, interval: Duration) -> Self {
        self.clearing_interval = interval;
        self
    }

    pub fn with_eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = policy;
        self
    }

    /// Makes the RANDOM policy reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the sweep period, substituting the default for zero.
    pub fn effective_clearing_interval(&self) -> Duration {
        if self.clearing_interval.is_zero() {
            DEFAULT_CLEARING_INTERVAL
        } else {
            self.clearing_interval
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 0,
            clearing_interval: DEFAULT_CLEARING_INTERVAL,
            eviction_policy: EvictionPolicy::Lru,
            seed: None,
        }
    }
}
