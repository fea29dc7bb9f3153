//! Thread-safe "partial" cache: a bounded LRU map behind one mutex.
//!
//! This cache forgets under memory pressure. Whenever a `put` pushes it over
//! capacity it immediately evicts the oldest two-thirds of its entries and
//! returns `true`, telling the taxonomy writer that negative `get` results
//! can no longer be trusted as "not found" until durable state is committed.

use parking_lot::Mutex;

use crate::error::{Result, TaxoCacheError};
use crate::label::CategoryPath;
use crate::label_to_ordinal::INVALID_ORDINAL;
use crate::lru_cache::NameIntCache;
use crate::TaxonomyWriterCache;

/// Default capacity of the writer's LRU cache.
pub const DEFAULT_LRU_CAPACITY: usize = 4000;

/// How LRU entries are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LruKeyPolicy {
    /// Key on the full label. Correctness-preserving, higher memory.
    ExactLabel,
    /// Key on the label's structural 64-bit hash. Lower memory; two distinct
    /// labels with an equal hash collapse to one entry — an accepted,
    /// documented trade-off, not a defect.
    HashedLabel,
}

enum LabelCache {
    Exact(NameIntCache<CategoryPath>),
    Hashed(NameIntCache<i64>),
}

impl LabelCache {
    fn new(policy: LruKeyPolicy, capacity: usize) -> Self {
        match policy {
            LruKeyPolicy::ExactLabel => LabelCache::Exact(NameIntCache::new(capacity)),
            LruKeyPolicy::HashedLabel => LabelCache::Hashed(NameIntCache::new(capacity)),
        }
    }

    fn get(&self, label: &CategoryPath) -> Option<i32> {
        match self {
            LabelCache::Exact(cache) => cache.get(label),
            LabelCache::Hashed(cache) => cache.get(&label.long_hash_code()),
        }
    }

    fn put(&mut self, label: &CategoryPath, ordinal: i32) -> bool {
        match self {
            LabelCache::Exact(cache) => cache.put(label.clone(), ordinal),
            LabelCache::Hashed(cache) => cache.put(label.long_hash_code(), ordinal),
        }
    }

    fn make_room_lru(&mut self) {
        match self {
            LabelCache::Exact(cache) => cache.make_room_lru(),
            LabelCache::Hashed(cache) => cache.make_room_lru(),
        }
    }

    fn len(&self) -> usize {
        match self {
            LabelCache::Exact(cache) => cache.len(),
            LabelCache::Hashed(cache) => cache.len(),
        }
    }
}

/// Bounded LRU taxonomy writer cache.
///
/// All operations serialize on a single mutex; the inner map is not
/// thread-safe on its own. `put` never returns with the map over capacity.
pub struct LruTaxonomyCache {
    state: Mutex<Option<LabelCache>>,
    policy: LruKeyPolicy,
    capacity: usize,
}

impl LruTaxonomyCache {
    pub fn new(capacity: usize, policy: LruKeyPolicy) -> Self {
        LruTaxonomyCache {
            state: Mutex::new(Some(LabelCache::new(policy, capacity))),
            policy,
            capacity,
        }
    }

    /// Current number of cached entries.
    pub fn len(&self) -> usize {
        self.state.lock().as_ref().map_or(0, LabelCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LruTaxonomyCache {
    /// Hashed keying at the writer's default capacity.
    fn default() -> Self {
        Self::new(DEFAULT_LRU_CAPACITY, LruKeyPolicy::HashedLabel)
    }
}

impl TaxonomyWriterCache for LruTaxonomyCache {
    fn get(&self, label: &CategoryPath) -> Result<i32> {
        let state = self.state.lock();
        let cache = state.as_ref().ok_or(TaxoCacheError::Closed)?;
        Ok(cache.get(label).unwrap_or(INVALID_ORDINAL))
    }

    fn put(&self, label: &CategoryPath, ordinal: i32) -> Result<bool> {
        let mut state = self.state.lock();
        let cache = state.as_mut().ok_or(TaxoCacheError::Closed)?;
        if cache.put(label, ordinal) {
            cache.make_room_lru();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn is_full(&self) -> bool {
        self.state
            .lock()
            .as_ref()
            .is_some_and(|cache| cache.len() >= self.capacity)
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.is_none() {
            return Err(TaxoCacheError::Closed);
        }
        // The map is replaced wholesale rather than drained in place.
        *state = Some(LabelCache::new(self.policy, self.capacity));
        Ok(())
    }

    fn close(&self) {
        *self.state.lock() = None;
    }
}
