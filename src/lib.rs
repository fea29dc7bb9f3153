//! # Taxocache - Label-to-Ordinal Caches for Taxonomy Writers
//!
//! `taxocache` provides the in-memory caching layer a faceted-search taxonomy
//! writer consults on every indexed document: given a hierarchical category
//! label, find its previously assigned integer ordinal or record a new one,
//! without touching durable storage for labels seen before. Two cache
//! families implement one contract:
//!
//! - **Complete cache** ([`CompleteTaxonomyCache`]): a compact, growable
//!   multi-level hash structure over an append-only string repository. It
//!   never evicts, so once fully populated a miss is a definitive "not found".
//! - **Partial cache** ([`LruTaxonomyCache`]): a bounded LRU map that evicts
//!   in bulk under memory pressure and tells the caller when it has done so.
//!
//! ## Quick Start
//!
//! ```rust
//! use taxocache::{CategoryPath, CompleteTaxonomyCache, TaxonomyWriterCache, INVALID_ORDINAL};
//!
//! # fn main() -> taxocache::Result<()> {
//! let cache = CompleteTaxonomyCache::default();
//!
//! let label = CategoryPath::new(&["year", "2024"]);
//! assert_eq!(cache.get(&label)?, INVALID_ORDINAL); // never seen
//!
//! cache.put(&label, 1)?;
//! assert_eq!(cache.get(&label)?, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Bounded caching
//!
//! ```rust
//! use taxocache::{CategoryPath, LruKeyPolicy, LruTaxonomyCache, TaxonomyWriterCache};
//!
//! # fn main() -> taxocache::Result<()> {
//! let cache = LruTaxonomyCache::new(1000, LruKeyPolicy::HashedLabel);
//! let evicted = cache.put(&CategoryPath::new(&["brand", "acme"]), 42)?;
//! if evicted {
//!     // The cache dropped old entries: commit durable state so negative
//!     // lookups can fall back to disk.
//! }
//! # Ok(())
//! # }
//! ```

pub mod char_block_array;
pub mod codec;
pub mod collision_map;
pub mod compact;
pub mod complete_cache;
pub mod error;
pub mod label;
pub mod label_to_ordinal;
mod lru_cache;
pub mod partial_cache;

// Re-export the types users need
pub use crate::char_block_array::CharBlockArray;
pub use crate::compact::CompactLabelToOrdinal;
pub use crate::complete_cache::CompleteTaxonomyCache;
pub use crate::error::{Result, TaxoCacheError};
pub use crate::label::CategoryPath;
pub use crate::label_to_ordinal::{LabelToOrdinal, INVALID_ORDINAL};
pub use crate::partial_cache::{LruKeyPolicy, LruTaxonomyCache};

/// The contract a taxonomy writer consumes.
///
/// A negative [`get`](TaxonomyWriterCache::get) result means "not found" only
/// while the caller knows the cache has never evicted since being fully
/// populated; after any `put` has returned `true` it means "unknown" and the
/// caller must fall back to durable storage. That is why implementations must
/// report eviction truthfully.
pub trait TaxonomyWriterCache: Send + Sync {
    /// Resolve a label to its ordinal, or a negative value
    /// ([`INVALID_ORDINAL`]) when the cache has no answer.
    fn get(&self, label: &CategoryPath) -> Result<i32>;

    /// Record `label -> ordinal`. Returns `true` if the cache evicted
    /// entries to make room, `false` if everything previously cached is
    /// still present.
    fn put(&self, label: &CategoryPath, ordinal: i32) -> Result<bool>;

    /// Whether the cache is at capacity. Always `false` for caches that
    /// grow instead of evicting.
    fn is_full(&self) -> bool;

    /// Drop every cached entry; the cache remains usable.
    fn clear(&self) -> Result<()>;

    /// Discard the cache. Terminal: subsequent operations fail.
    fn close(&self);
}
