//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a cache.
//!
//! # Tasks
//! - Expiry sweep: removes entries whose TTL elapsed at a fixed interval

mod sweeper;

pub use sweeper::{spawn_sweeper, Sweeper};
