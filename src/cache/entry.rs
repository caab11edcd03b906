//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

// == Cache Entry ==
/// Represents a single cache entry with value and access metadata.
///
/// The TTL is measured from the last access, so every successful read
/// pushes the deadline forward.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Time-to-live, `Duration::ZERO` = never expires
    pub ttl: Duration,
    /// Number of accesses, starting at 1 on insert
    pub access_count: u64,
    /// Monotonic timestamp of the last access
    pub last_access: Instant,
    /// Wall-clock timestamp of the last access, for diagnostics
    pub last_access_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry with a fresh access counter.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Time-to-live, zero for no expiration
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            ttl,
            access_count: 1,
            last_access: Instant::now(),
            last_access_at: Utc::now(),
        }
    }

    // == Touch ==
    /// Records an access: bumps the counter and refreshes both timestamps.
    pub fn touch(&mut self) {
        self.access_count += 1;
        self.last_access = Instant::now();
        self.last_access_at = Utc::now();
    }

    // == Is Expired ==
    /// Checks if the entry has expired at the given instant.
    ///
    /// An entry is expired once `last_access + ttl` lies strictly before `now`.
    /// Entries with a zero TTL never expire.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        if self.ttl.is_zero() {
            return false;
        }
        match self.last_access.checked_add(self.ttl) {
            Some(deadline) => deadline < now,
            None => false,
        }
    }

    /// Checks if the entry has expired as of now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}
