//! Category label type: an ordered, immutable sequence of string components.
//!
//! The zero-component label is the taxonomy root. Labels compare and hash
//! structurally; `hash_code` and `long_hash_code` are the bucket hashes the
//! caches key on, computed over UTF-16 code units so they stay identical to
//! the hashes recomputed from serialized records (see [`crate::codec`]).

/// A category path in a faceted-search taxonomy, e.g. `["authors", "le guin"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryPath {
    components: Vec<String>,
}

impl CategoryPath {
    /// The root label: zero components.
    pub fn root() -> Self {
        CategoryPath {
            components: Vec::new(),
        }
    }

    /// Create a label from path components, root-first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use taxocache::CategoryPath;
    ///
    /// let label = CategoryPath::new(&["year", "2024", "06"]);
    /// assert_eq!(label.len(), 3);
    /// ```
    pub fn new(components: &[&str]) -> Self {
        CategoryPath {
            components: components.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// The path components, root-first.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True for the root label.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Structural 32-bit hash: `h = len; per component: h = h*31 + component_hash`,
    /// where the component hash folds UTF-16 units with multiplier 31.
    ///
    /// This must match [`crate::codec::hash_of_serialized`] replayed over the
    /// serialized record of the same label; the compact table's lookups
    /// silently corrupt if the two ever diverge.
    pub fn hash_code(&self) -> i32 {
        let mut hash = self.components.len() as i32;
        for component in &self.components {
            hash = hash.wrapping_mul(31).wrapping_add(string_hash(component));
        }
        hash
    }

    /// Structural 64-bit hash, used by the hashed-key LRU cache. Two distinct
    /// labels with equal long hashes are deliberately treated as one entry
    /// there.
    pub fn long_hash_code(&self) -> i64 {
        let mut hash = self.components.len() as i64;
        for component in &self.components {
            hash = hash
                .wrapping_mul(65599)
                .wrapping_add(string_hash(component) as i64);
        }
        hash
    }
}

impl From<Vec<String>> for CategoryPath {
    fn from(components: Vec<String>) -> Self {
        CategoryPath { components }
    }
}

/// 31-based hash over a string's UTF-16 code units.
pub(crate) fn string_hash(s: &str) -> i32 {
    let mut hash = 0i32;
    for unit in s.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(unit as i32);
    }
    hash
}
