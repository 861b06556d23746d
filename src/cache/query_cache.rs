//! # Tiered Query Cache
//!
//! Three independent LRU partitions with their own capacity and ttl.
//! Each tier sits behind its own mutex, so a lookup or insert is atomic with
//! respect to other workers and never exposes a half-written entry.
//!
//! There is no single-flight: two workers missing on the same key both
//! compute and both `put`, and the later write wins.

use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;

use super::key::CacheKey;
use super::stats::{TierStats, TierStatsSnapshot};
use super::tier::{CacheConfig, CacheTier, TierConfig};
use crate::clock::{system_clock, SharedClock};

/// Stored value plus the time it was written
#[derive(Debug)]
pub struct CacheEntry<V> {
    pub value: Arc<V>,
    pub inserted_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    /// Expired once `now - inserted_at >= ttl`
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.inserted_at >= ttl
    }
}

struct Partition<V> {
    config: TierConfig,
    entries: Mutex<LruCache<CacheKey, CacheEntry<V>>>,
    stats: TierStats,
}

impl<V> Partition<V> {
    fn new(config: TierConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            entries: Mutex::new(LruCache::new(capacity)),
            stats: TierStats::default(),
        }
    }
}

/// Shared, tiered cache of query results
pub struct QueryCache<V> {
    partitions: [Partition<V>; 3],
    clock: SharedClock,
}

impl<V> QueryCache<V> {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    pub fn with_clock(config: &CacheConfig, clock: SharedClock) -> Self {
        Self {
            partitions: CacheTier::ALL.map(|tier| Partition::new(config.tier(tier))),
            clock,
        }
    }

    fn partition(&self, tier: CacheTier) -> &Partition<V> {
        &self.partitions[tier.index()]
    }

    /// Fresh entry for `key`, or `None`. Expired entries are dropped here.
    pub fn get(&self, tier: CacheTier, key: &CacheKey) -> Option<Arc<V>> {
        let partition = self.partition(tier);
        let now = self.clock.now();
        let ttl = partition.config.ttl();
        let mut entries = partition.entries.lock();

        let expired = match entries.peek(key) {
            Some(entry) => entry.is_expired(now, ttl),
            None => {
                partition.stats.record_miss();
                return None;
            }
        };

        if expired {
            entries.pop(key);
            partition.stats.record_expiration();
            partition.stats.record_miss();
            return None;
        }

        partition.stats.record_hit();
        entries.get(key).map(|entry| Arc::clone(&entry.value))
    }

    /// Insert or overwrite; evicts the least recently used entry when full
    pub fn put(&self, tier: CacheTier, key: CacheKey, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.put_shared(tier, key, Arc::clone(&value));
        value
    }

    pub fn put_shared(&self, tier: CacheTier, key: CacheKey, value: Arc<V>) {
        let partition = self.partition(tier);
        let entry = CacheEntry {
            value,
            inserted_at: self.clock.now(),
        };
        let mut entries = partition.entries.lock();
        if let Some((displaced, _)) = entries.push(key.clone(), entry) {
            if displaced != key {
                partition.stats.record_eviction();
            }
        }
    }

    /// Remove one entry; true if it was present
    pub fn invalidate(&self, tier: CacheTier, key: &CacheKey) -> bool {
        self.partition(tier).entries.lock().pop(key).is_some()
    }

    pub fn clear_tier(&self, tier: CacheTier) {
        self.partition(tier).entries.lock().clear();
    }

    pub fn clear(&self) {
        for tier in CacheTier::ALL {
            self.clear_tier(tier);
        }
    }

    /// Stored entries, including ones not yet found expired
    pub fn len(&self, tier: CacheTier) -> usize {
        self.partition(tier).entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        CacheTier::ALL.iter().all(|tier| self.len(*tier) == 0)
    }

    pub fn stats(&self, tier: CacheTier) -> TierStatsSnapshot {
        let partition = self.partition(tier);
        TierStatsSnapshot {
            tier,
            capacity: partition.config.capacity,
            ttl_secs: partition.config.ttl_secs,
            entries: partition.entries.lock().len(),
            hits: partition.stats.hits(),
            misses: partition.stats.misses(),
            evictions: partition.stats.evictions(),
            expirations: partition.stats.expirations(),
        }
    }

    pub fn all_stats(&self) -> Vec<TierStatsSnapshot> {
        CacheTier::ALL.iter().map(|tier| self.stats(*tier)).collect()
    }
}

impl<V> std::fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("short", &self.len(CacheTier::Short))
            .field("medium", &self.len(CacheTier::Medium))
            .field("long", &self.len(CacheTier::Long))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::clock::ManualClock;

    fn setup(short: TierConfig) -> (QueryCache<String>, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap());
        let config = CacheConfig::default().with_tier(CacheTier::Short, short);
        let cache = QueryCache::with_clock(&config, Arc::new(clock.clone()));
        (cache, clock)
    }

    fn key(name: &str) -> CacheKey {
        CacheKey::of(name)
    }

    #[test]
    fn test_put_then_get() {
        let (cache, _) = setup(TierConfig::new(10, 60));
        cache.put(CacheTier::Short, key("a"), "value".to_string());
        assert_eq!(
            cache.get(CacheTier::Short, &key("a")).as_deref(),
            Some(&"value".to_string())
        );
        assert_eq!(cache.stats(CacheTier::Short).hits, 1);
    }

    #[test]
    fn test_tiers_are_isolated() {
        let (cache, _) = setup(TierConfig::new(10, 60));
        cache.put(CacheTier::Short, key("a"), "value".to_string());
        assert!(cache.get(CacheTier::Long, &key("a")).is_none());
    }

    #[test]
    fn test_expires_exactly_at_ttl() {
        let (cache, clock) = setup(TierConfig::new(10, 60));
        cache.put(CacheTier::Short, key("a"), "value".to_string());

        clock.advance(Duration::seconds(59));
        assert!(cache.get(CacheTier::Short, &key("a")).is_some());

        clock.advance(Duration::seconds(1));
        assert!(cache.get(CacheTier::Short, &key("a")).is_none());
        assert_eq!(cache.len(CacheTier::Short), 0);

        let stats = cache.stats(CacheTier::Short);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_overwrite_refreshes_entry() {
        let (cache, clock) = setup(TierConfig::new(10, 60));
        cache.put(CacheTier::Short, key("a"), "old".to_string());
        clock.advance(Duration::seconds(50));
        cache.put(CacheTier::Short, key("a"), "new".to_string());
        clock.advance(Duration::seconds(50));

        assert_eq!(
            cache.get(CacheTier::Short, &key("a")).as_deref(),
            Some(&"new".to_string())
        );
        assert_eq!(cache.stats(CacheTier::Short).evictions, 0);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let (cache, _) = setup(TierConfig::new(2, 60));
        cache.put(CacheTier::Short, key("a"), "a".to_string());
        cache.put(CacheTier::Short, key("b"), "b".to_string());

        // touch a so b becomes the oldest
        assert!(cache.get(CacheTier::Short, &key("a")).is_some());
        cache.put(CacheTier::Short, key("c"), "c".to_string());

        assert!(cache.get(CacheTier::Short, &key("b")).is_none());
        assert!(cache.get(CacheTier::Short, &key("a")).is_some());
        assert!(cache.get(CacheTier::Short, &key("c")).is_some());
        assert_eq!(cache.stats(CacheTier::Short).evictions, 1);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let (cache, _) = setup(TierConfig::new(0, 60));
        cache.put(CacheTier::Short, key("a"), "a".to_string());
        assert_eq!(cache.len(CacheTier::Short), 1);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let (cache, _) = setup(TierConfig::new(10, 60));
        cache.put(CacheTier::Short, key("a"), "a".to_string());
        cache.put(CacheTier::Long, key("b"), "b".to_string());

        assert!(cache.invalidate(CacheTier::Short, &key("a")));
        assert!(!cache.invalidate(CacheTier::Short, &key("a")));

        cache.clear();
        assert!(cache.is_empty());
    }
}
