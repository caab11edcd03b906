//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// Expired and absent keys are deliberately reported with the same variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is absent or its TTL elapsed
    #[error("Key not found")]
    NotFound,

    /// The cache holds no entries
    #[error("No keys found: cache is empty")]
    EmptyCache,

    /// Capacity argument could not be used as an entry count
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),

    /// Policy argument is not one of LRU, MRU, LFU or RANDOM
    #[error("Invalid eviction policy: {0} (must be 0-3 or LRU, MRU, LFU, RANDOM)")]
    InvalidPolicy(String),

    /// Construction was attempted outside of a Tokio runtime
    #[error("No Tokio runtime available to run the expiry sweeper")]
    RuntimeUnavailable,
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
