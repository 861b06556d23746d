//! Cache tiers and their capacity/freshness policies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Named cache partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTier {
    /// General listings
    Short,
    /// Search and composite-filter results
    Medium,
    /// Low-cardinality reference lists
    Long,
}

impl CacheTier {
    pub const ALL: [CacheTier; 3] = [CacheTier::Short, CacheTier::Medium, CacheTier::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheTier::Short => "short",
            CacheTier::Medium => "medium",
            CacheTier::Long => "long",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            CacheTier::Short => 0,
            CacheTier::Medium => 1,
            CacheTier::Long => 2,
        }
    }
}

impl fmt::Display for CacheTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capacity and time-to-live of one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Maximum number of entries
    pub capacity: usize,

    /// Seconds an entry stays fresh
    pub ttl_secs: u64,
}

impl TierConfig {
    pub fn new(capacity: usize, ttl_secs: u64) -> Self {
        Self { capacity, ttl_secs }
    }

    pub fn ttl(&self) -> chrono::Duration {
        let max_secs = (i64::MAX / 1000) as u64;
        chrono::Duration::seconds(self.ttl_secs.min(max_secs) as i64)
    }
}

fn default_short() -> TierConfig {
    TierConfig::new(500, 5 * 60)
}

fn default_medium() -> TierConfig {
    TierConfig::new(1000, 10 * 60)
}

fn default_long() -> TierConfig {
    TierConfig::new(100, 30 * 60)
}

/// Per-tier configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_short")]
    pub short: TierConfig,

    #[serde(default = "default_medium")]
    pub medium: TierConfig,

    #[serde(default = "default_long")]
    pub long: TierConfig,
}

impl CacheConfig {
    pub fn tier(&self, tier: CacheTier) -> TierConfig {
        match tier {
            CacheTier::Short => self.short,
            CacheTier::Medium => self.medium,
            CacheTier::Long => self.long,
        }
    }

    /// Override a single tier
    pub fn with_tier(mut self, tier: CacheTier, config: TierConfig) -> Self {
        match tier {
            CacheTier::Short => self.short = config,
            CacheTier::Medium => self.medium = config,
            CacheTier::Long => self.long = config,
        }
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            short: default_short(),
            medium: default_medium(),
            long: default_long(),
        }
    }
}
