//! Thread-safe "complete" cache: the compact table behind a reader/writer
//! lock with a bounded acquisition timeout.
//!
//! This cache never forgets — it grows instead — so once the caller has fully
//! populated it, a negative `get` really does mean "not found" and the
//! durable index never needs to be consulted again. `put` therefore always
//! reports that nothing was evicted.

use std::time::Duration;

use parking_lot::RwLock;

use crate::compact::CompactLabelToOrdinal;
use crate::error::{Result, TaxoCacheError};
use crate::label::CategoryPath;
use crate::label_to_ordinal::LabelToOrdinal;
use crate::TaxonomyWriterCache;

/// Defaults matching the taxonomy writer's standard cache construction.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;
pub const DEFAULT_LOAD_FACTOR: f32 = 0.15;
pub const DEFAULT_NUM_HASH_ARRAYS: usize = 3;

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Complete (never-evicting) taxonomy writer cache.
///
/// Readers serialize `get`; writers serialize `put` and `clear`. Failing to
/// acquire the lock within the timeout is a hard [`TaxoCacheError::LockTimeout`]
/// propagated to the caller, never retried internally.
///
/// # Examples
///
/// ```rust
/// use taxocache::{CategoryPath, CompleteTaxonomyCache, TaxonomyWriterCache, INVALID_ORDINAL};
///
/// # fn main() -> taxocache::Result<()> {
/// let cache = CompleteTaxonomyCache::default();
/// let label = CategoryPath::new(&["authors", "le guin"]);
///
/// assert_eq!(cache.get(&label)?, INVALID_ORDINAL);
/// let evicted = cache.put(&label, 1)?;
/// assert!(!evicted); // this cache grows instead of evicting
/// assert_eq!(cache.get(&label)?, 1);
/// # Ok(())
/// # }
/// ```
pub struct CompleteTaxonomyCache {
    table: RwLock<Option<CompactLabelToOrdinal>>,
    initial_capacity: usize,
    load_factor: f32,
    num_hash_arrays: usize,
    lock_timeout: Duration,
}

impl CompleteTaxonomyCache {
    pub fn new(initial_capacity: usize, load_factor: f32, num_hash_arrays: usize) -> Self {
        let table = CompactLabelToOrdinal::new(initial_capacity, load_factor, num_hash_arrays);
        CompleteTaxonomyCache {
            table: RwLock::new(Some(table)),
            initial_capacity,
            load_factor,
            num_hash_arrays,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Wrap an already-populated table, e.g. one reloaded via
    /// [`CompactLabelToOrdinal::open`].
    pub fn from_table(table: CompactLabelToOrdinal, lock_timeout: Duration) -> Self {
        CompleteTaxonomyCache {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            num_hash_arrays: DEFAULT_NUM_HASH_ARRAYS,
            table: RwLock::new(Some(table)),
            lock_timeout,
        }
    }

    /// Override the bounded lock-acquisition timeout.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Run `f` against the table under the read lock; used for checkpoints
    /// like flushing outside the normal contract surface.
    pub fn with_table<T>(&self, f: impl FnOnce(&CompactLabelToOrdinal) -> Result<T>) -> Result<T> {
        let guard = self
            .table
            .try_read_for(self.lock_timeout)
            .ok_or(TaxoCacheError::LockTimeout(self.lock_timeout))?;
        let table = guard.as_ref().ok_or(TaxoCacheError::Closed)?;
        f(table)
    }
}

impl Default for CompleteTaxonomyCache {
    fn default() -> Self {
        Self::new(
            DEFAULT_INITIAL_CAPACITY,
            DEFAULT_LOAD_FACTOR,
            DEFAULT_NUM_HASH_ARRAYS,
        )
    }
}

impl TaxonomyWriterCache for CompleteTaxonomyCache {
    fn get(&self, label: &CategoryPath) -> Result<i32> {
        let guard = self
            .table
            .try_read_for(self.lock_timeout)
            .ok_or(TaxoCacheError::LockTimeout(self.lock_timeout))?;
        let table = guard.as_ref().ok_or(TaxoCacheError::Closed)?;
        Ok(table.get_ordinal(label))
    }

    fn put(&self, label: &CategoryPath, ordinal: i32) -> Result<bool> {
        let mut guard = self
            .table
            .try_write_for(self.lock_timeout)
            .ok_or(TaxoCacheError::LockTimeout(self.lock_timeout))?;
        let table = guard.as_mut().ok_or(TaxoCacheError::Closed)?;
        table.add_label(label, ordinal)?;
        // Never evicts; growth happens inline inside add_label when needed.
        Ok(false)
    }

    fn is_full(&self) -> bool {
        false
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .table
            .try_write_for(self.lock_timeout)
            .ok_or(TaxoCacheError::LockTimeout(self.lock_timeout))?;
        if guard.is_none() {
            return Err(TaxoCacheError::Closed);
        }
        *guard = Some(CompactLabelToOrdinal::new(
            self.initial_capacity,
            self.load_factor,
            self.num_hash_arrays,
        ));
        Ok(())
    }

    fn close(&self) {
        // Terminal: the instance is discarded, not reusable.
        *self.table.write() = None;
    }
}
