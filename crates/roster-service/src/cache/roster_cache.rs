//! Per-guild TTL cache for the aggregated roster response
//!
//! Aggregation re-derives from three stores plus live role-name lookups and
//! is the most expensive read path in the system; role/name drift within the
//! TTL window is tolerated by the product. One value per guild, fixed expiry,
//! explicit invalidation, no stampede protection.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use roster_core::Snowflake;

use crate::dto::RosterResponse;

struct CacheSlot {
    expires_at: Instant,
    value: Arc<RosterResponse>,
}

/// Per-guild roster response cache
#[derive(Clone)]
pub struct RosterCache {
    ttl: Duration,
    slots: Arc<DashMap<i64, CacheSlot>>,
}

impl RosterCache {
    /// Create a cache with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Arc::new(DashMap::new()),
        }
    }

    /// Get the cached roster for a guild, if still fresh
    pub fn get(&self, guild_id: Snowflake) -> Option<Arc<RosterResponse>> {
        let key = guild_id.into_inner();
        if let Some(slot) = self.slots.get(&key) {
            if slot.expires_at > Instant::now() {
                return Some(Arc::clone(&slot.value));
            }
        }
        // Expired: drop the slot so the map does not accumulate dead guilds
        self.slots.remove_if(&key, |_, slot| slot.expires_at <= Instant::now());
        None
    }

    /// Store a freshly-aggregated roster and return the shared handle
    pub fn insert(&self, guild_id: Snowflake, value: RosterResponse) -> Arc<RosterResponse> {
        let value = Arc::new(value);
        self.slots.insert(
            guild_id.into_inner(),
            CacheSlot {
                expires_at: Instant::now() + self.ttl,
                value: Arc::clone(&value),
            },
        );
        value
    }

    /// Drop the cached value for a guild (admin refresh action)
    pub fn invalidate(&self, guild_id: Snowflake) {
        self.slots.remove(&guild_id.into_inner());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let cache = RosterCache::new(Duration::from_secs(60));
        let guild = Snowflake::new(1);

        assert!(cache.get(guild).is_none());
        cache.insert(guild, RosterResponse::default());
        assert!(cache.get(guild).is_some());
    }

    #[test]
    fn test_expiry() {
        let cache = RosterCache::new(Duration::from_millis(10));
        let guild = Snowflake::new(1);

        cache.insert(guild, RosterResponse::default());
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get(guild).is_none());
    }

    #[test]
    fn test_invalidate() {
        let cache = RosterCache::new(Duration::from_secs(60));
        let guild = Snowflake::new(1);

        cache.insert(guild, RosterResponse::default());
        cache.invalidate(guild);
        assert!(cache.get(guild).is_none());
    }

    #[test]
    fn test_guilds_are_independent() {
        let cache = RosterCache::new(Duration::from_secs(60));
        cache.insert(Snowflake::new(1), RosterResponse::default());
        assert!(cache.get(Snowflake::new(2)).is_none());
    }
}
