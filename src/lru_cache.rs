//! Capacity-bounded key-to-ordinal map with bulk eviction.
//!
//! Reads deliberately do not refresh recency, so eviction order approximates
//! insertion/update order rather than true access recency — a documented
//! simplification. Eviction is bulk by design: every time the owner reports
//! fullness the caller has to force a durability commit so evicted entries
//! stay discoverable on disk, and evicting one entry at a time would force a
//! commit on nearly every insert at steady state.

use std::hash::Hash;

use ahash::RandomState;
use lru::LruCache;
use tracing::debug;

/// Bounded map from cache key to ordinal. The capacity is enforced by this
/// type, not the underlying map, so a `put` can leave it transiently over
/// capacity until [`NameIntCache::make_room_lru`] runs.
pub(crate) struct NameIntCache<K: Hash + Eq> {
    map: LruCache<K, i32, RandomState>,
    capacity: usize,
}

impl<K: Hash + Eq> NameIntCache<K> {
    pub(crate) fn new(capacity: usize) -> Self {
        NameIntCache {
            map: LruCache::unbounded_with_hasher(RandomState::new()),
            capacity,
        }
    }

    /// Non-promoting read.
    pub(crate) fn get(&self, key: &K) -> Option<i32> {
        self.map.peek(key).copied()
    }

    /// Unconditional upsert. Returns true when the map is now over capacity
    /// and the owner must make room.
    pub(crate) fn put(&mut self, key: K, ordinal: i32) -> bool {
        self.map.put(key, ordinal);
        self.map.len() > self.capacity
    }

    /// Bulk eviction: drop the oldest two-thirds of entries in one pass,
    /// keeping the newest third.
    pub(crate) fn make_room_lru(&mut self) {
        if self.map.len() <= self.capacity {
            return;
        }
        let keep = self.map.len() / 3;
        let evicted = self.map.len() - keep;
        while self.map.len() > keep {
            self.map.pop_lru();
        }
        debug!("Evicted {} oldest cache entries, {} kept", evicted, keep);
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get() {
        let mut cache: NameIntCache<u64> = NameIntCache::new(4);
        assert_eq!(cache.get(&1), None);
        assert!(!cache.put(1, 10));
        assert_eq!(cache.get(&1), Some(10));
        // Upsert replaces the value without growing the map.
        assert!(!cache.put(1, 11));
        assert_eq!(cache.get(&1), Some(11));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_signals_over_capacity() {
        let mut cache: NameIntCache<u64> = NameIntCache::new(2);
        assert!(!cache.put(1, 1));
        assert!(!cache.put(2, 2));
        assert!(cache.put(3, 3));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_make_room_evicts_oldest_two_thirds() {
        let mut cache: NameIntCache<u64> = NameIntCache::new(10);
        for i in 0..10u64 {
            assert!(!cache.put(i, i as i32));
        }
        assert!(cache.put(10, 10));

        cache.make_room_lru();
        assert!(cache.len() <= 10);
        let surviving = (0..=10u64).filter(|k| cache.get(k).is_some()).count();
        assert_eq!(surviving, cache.len());
        // At least two-thirds of the 10 prior entries are gone, and the
        // survivors are the newest insertions.
        let prior_survivors = (0..10u64).filter(|k| cache.get(k).is_some()).count();
        assert!(prior_survivors <= 3, "only {} evicted", 10 - prior_survivors);
        assert_eq!(cache.get(&10), Some(10));
    }

    #[test]
    fn test_reads_do_not_refresh_recency() {
        let mut cache: NameIntCache<u64> = NameIntCache::new(3);
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3);
        // Touch the oldest entry, then overflow: 1 must still be evicted
        // because gets do not promote.
        assert_eq!(cache.get(&1), Some(1));
        cache.put(4, 4);
        cache.make_room_lru();
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&4), Some(4));
    }

    #[test]
    fn test_clear() {
        let mut cache: NameIntCache<u64> = NameIntCache::new(4);
        cache.put(1, 1);
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get(&1), None);
    }
}
