//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and pluggable eviction
//! (LRU, MRU, LFU, RANDOM).

mod entry;
mod policy;
mod recency;
mod stats;
mod store;
mod table;


// Re-export public types
pub use entry::CacheEntry;
pub use policy::EvictionPolicy;
pub use recency::{Iter as RecencyIter, RecencyIndex};
pub use stats::{CacheMetrics, CacheStats, EntrySnapshot};
pub use store::CacheStore;
pub use table::EntryTable;
