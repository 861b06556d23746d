//! # Query Cache
//!
//! In-process, tiered result cache keyed by query shape.
//!
//! | Tier | Default capacity | Default ttl | Holds |
//! |---|---|---|---|
//! | short | 500 | 5 min | general listings |
//! | medium | 1000 | 10 min | search and composite filters |
//! | long | 100 | 30 min | reference values and statistics |
//!
//! The cache is constructed once and shared through an `Arc`; nothing
//! reaches it through global state. Contents live for the process only.

mod key;
mod query_cache;
mod stats;
mod tier;

pub use key::{CacheKey, CacheKeyBuilder};
pub use query_cache::{CacheEntry, QueryCache};
pub use stats::{TierStats, TierStatsSnapshot};
pub use tier::{CacheConfig, CacheTier, TierConfig};
