//! Lens Metadata LRU Cache
//!
//! A bounded `u32`-keyed cache with exact least-recently-used eviction,
//! used to amortize slow lens-calibration loads. Lookup is O(1) through a
//! hash index; recency is tracked in a doubly linked list laid out in an
//! arena, so no per-entry heap nodes are allocated after warm-up.

mod cache;

pub use cache::LruCache;

use thiserror::Error;

/// Errors that can occur constructing a cache
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity zero cannot hold an entry
    #[error("cache capacity must be at least 1")]
    InvalidCapacity,
}
