//! Ordinal allocation contract shared by label-to-ordinal structures.

use crate::error::Result;
use crate::label::CategoryPath;

/// Sentinel ordinal meaning "not found / unknown".
pub const INVALID_ORDINAL: i32 = -2;

/// A structure that assigns and resolves ordinals for category labels.
///
/// Implementors own the ordinal counter as an explicit field; it is only ever
/// advanced through [`LabelToOrdinal::get_next_ordinal`].
pub trait LabelToOrdinal {
    /// Allocate and return the next ordinal.
    fn get_next_ordinal(&mut self) -> i32;

    /// The number of ordinals allocated so far (one past the highest).
    fn max_ordinal(&self) -> i32;

    /// Record `label -> ordinal`. Offering the same label a second time with
    /// the same ordinal succeeds silently; with a different ordinal it is a
    /// caller-integrity error.
    fn add_label(&mut self, label: &CategoryPath, ordinal: i32) -> Result<()>;

    /// Resolve a label, or [`INVALID_ORDINAL`] if it was never added.
    fn get_ordinal(&self, label: &CategoryPath) -> i32;
}
