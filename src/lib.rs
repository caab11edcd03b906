//! Cacher - An in-process key/value cache
//!
//! Bounds memory by capacity and per-entry TTL, evicting with one of several
//! interchangeable policies (LRU, MRU, LFU, RANDOM).

pub mod cache;
pub mod cacher;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, EvictionPolicy};
pub use cacher::Cacher;
pub use config::CacheConfig;
pub use error::{CacheError, Result};
