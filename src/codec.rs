//! Serialized-label codec over the char buffer.
//!
//! A record is self-delimiting: one u16 component count, then per component a
//! u16 unit length followed by that many UTF-16 units. The three core
//! functions hash and compare labels directly against record bytes so lookups
//! never materialize a `CategoryPath`.
//!
//! Invariant: [`hash_of_serialized`] replayed over a record must equal
//! [`CategoryPath::hash_code`] on the live label, and every bucket index in
//! the crate is derived through the single [`mix_hash`] finisher. Divergence
//! between the two hash paths silently corrupts lookups.

use crate::char_block_array::CharBlockArray;
use crate::error::{Result, TaxoCacheError};
use crate::label::CategoryPath;

/// Hard ceiling inherited from the u16 record fields.
pub(crate) const MAX_COMPONENTS: usize = u16::MAX as usize;
pub(crate) const MAX_COMPONENT_UNITS: usize = u16::MAX as usize;

/// Append the record for `label` at the buffer's current tail.
///
/// The caller records the offset it used; nothing is returned. Labels over
/// the u16 ceilings are rejected rather than silently truncated.
pub fn serialize(label: &CategoryPath, buffer: &mut CharBlockArray) -> Result<()> {
    let count = label.len();
    if count > MAX_COMPONENTS {
        return Err(TaxoCacheError::TooManyComponents(count));
    }
    // Validate every component before the first append so a failed call
    // leaves the buffer tail untouched.
    let mut unit_lengths = Vec::with_capacity(count);
    for component in label.components() {
        let units = component.encode_utf16().count();
        if units > MAX_COMPONENT_UNITS {
            return Err(TaxoCacheError::ComponentTooLong(units));
        }
        unit_lengths.push(units as u16);
    }

    buffer.append(count as u16);
    for (component, &units) in label.components().iter().zip(&unit_lengths) {
        buffer.append(units);
        buffer.append_str(component);
    }
    Ok(())
}

/// Recompute the structural hash of the record at `offset` without
/// deserializing it. Returns the raw (unfinished) hash; callers apply
/// [`mix_hash`] before bucket indexing.
pub fn hash_of_serialized(buffer: &CharBlockArray, offset: usize) -> i32 {
    let mut cursor = offset;
    let count = buffer.char_at(cursor) as usize;
    cursor += 1;

    let mut hash = count as i32;
    for _ in 0..count {
        let units = buffer.char_at(cursor) as usize;
        cursor += 1;
        let mut component_hash = 0i32;
        for i in 0..units {
            component_hash = component_hash
                .wrapping_mul(31)
                .wrapping_add(buffer.char_at(cursor + i) as i32);
        }
        hash = hash.wrapping_mul(31).wrapping_add(component_hash);
        cursor += units;
    }
    hash
}

/// Structural comparison of a live label against the record at `offset`,
/// short-circuiting on the first mismatching length or unit.
pub fn equals_serialized(label: &CategoryPath, buffer: &CharBlockArray, offset: usize) -> bool {
    let mut cursor = offset;
    if buffer.char_at(cursor) as usize != label.len() {
        return false;
    }
    cursor += 1;

    for component in label.components() {
        let units = buffer.char_at(cursor) as usize;
        cursor += 1;
        let mut matched = 0usize;
        for unit in component.encode_utf16() {
            if matched == units || buffer.char_at(cursor + matched) != unit {
                return false;
            }
            matched += 1;
        }
        if matched != units {
            return false;
        }
        cursor += units;
    }
    true
}

/// Compare the records at two offsets, unit for unit. Used by the
/// offset-based insert paths (rehash, stream open), which never hold a live
/// label.
pub fn equals_serialized_pair(buffer: &CharBlockArray, a: usize, b: usize) -> bool {
    if a == b {
        return true;
    }
    let end_a = record_span(buffer, a);
    let end_b = record_span(buffer, b);
    if end_a - a != end_b - b {
        return false;
    }
    (0..end_a - a).all(|i| buffer.char_at(a + i) == buffer.char_at(b + i))
}

/// End offset of the record starting at `offset`, assuming a well-formed
/// record written by [`serialize`].
fn record_span(buffer: &CharBlockArray, offset: usize) -> usize {
    let mut cursor = offset;
    let count = buffer.char_at(cursor) as usize;
    cursor += 1;
    for _ in 0..count {
        let units = buffer.char_at(cursor) as usize;
        cursor += 1 + units;
    }
    cursor
}

/// Bounds-checked record walker for untrusted streams: the end offset of the
/// record at `offset`, or a corrupt-stream error if any length field runs
/// past the buffer.
pub(crate) fn record_end(buffer: &CharBlockArray, offset: usize) -> Result<usize> {
    let len = buffer.len();
    let mut cursor = offset;
    if cursor >= len {
        return Err(TaxoCacheError::CorruptStream(format!(
            "record offset {} past end of buffer ({} units)",
            offset, len
        )));
    }
    let count = buffer.char_at(cursor) as usize;
    cursor += 1;
    for _ in 0..count {
        if cursor >= len {
            return Err(TaxoCacheError::CorruptStream(format!(
                "record at offset {} truncated",
                offset
            )));
        }
        let units = buffer.char_at(cursor) as usize;
        cursor += 1 + units;
    }
    if cursor > len {
        return Err(TaxoCacheError::CorruptStream(format!(
            "record at offset {} truncated",
            offset
        )));
    }
    Ok(cursor)
}

/// The shared hash finisher. Every hash used for bucket indexing, whether it
/// came from a live label or from record bytes, goes through this exact
/// mixing before masking.
pub fn mix_hash(mut hash: i32) -> i32 {
    hash ^= (((hash as u32) >> 20) ^ ((hash as u32) >> 12)) as i32;
    hash ^ ((hash as u32) >> 7) as i32 ^ ((hash as u32) >> 4) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialized(label: &CategoryPath) -> (CharBlockArray, usize) {
        let mut buffer = CharBlockArray::with_block_size(8);
        buffer.append_str("pad"); // offsets need not start at 0
        let offset = buffer.len();
        serialize(label, &mut buffer).unwrap();
        (buffer, offset)
    }

    #[test]
    fn test_live_and_serialized_hashes_agree() {
        for label in [
            CategoryPath::root(),
            CategoryPath::new(&["a"]),
            CategoryPath::new(&["authors", "le guin"]),
            CategoryPath::new(&["日付", "2024", "𝕒"]),
        ] {
            let (buffer, offset) = serialized(&label);
            assert_eq!(
                hash_of_serialized(&buffer, offset),
                label.hash_code(),
                "hash divergence for {:?}",
                label
            );
        }
    }

    #[test]
    fn test_equals_serialized() {
        let label = CategoryPath::new(&["a", "bb", "ccc"]);
        let (buffer, offset) = serialized(&label);

        assert!(equals_serialized(&label, &buffer, offset));
        assert!(!equals_serialized(&CategoryPath::new(&["a", "bb"]), &buffer, offset));
        assert!(!equals_serialized(&CategoryPath::new(&["a", "bb", "ccd"]), &buffer, offset));
        assert!(!equals_serialized(&CategoryPath::new(&["a", "bb", "cc"]), &buffer, offset));
        assert!(!equals_serialized(&CategoryPath::new(&["a", "bb", "cccc"]), &buffer, offset));
    }

    #[test]
    fn test_equals_serialized_pair() {
        let mut buffer = CharBlockArray::with_block_size(8);
        let a = buffer.len();
        serialize(&CategoryPath::new(&["x", "y"]), &mut buffer).unwrap();
        let b = buffer.len();
        serialize(&CategoryPath::new(&["x", "y"]), &mut buffer).unwrap();
        let c = buffer.len();
        serialize(&CategoryPath::new(&["x", "z"]), &mut buffer).unwrap();

        assert!(equals_serialized_pair(&buffer, a, a));
        assert!(equals_serialized_pair(&buffer, a, b));
        assert!(!equals_serialized_pair(&buffer, a, c));
    }

    #[test]
    fn test_record_end_walks_and_rejects_truncation() {
        let mut buffer = CharBlockArray::with_block_size(8);
        serialize(&CategoryPath::new(&["ab", "c"]), &mut buffer).unwrap();
        // count + (len + 2 units) + (len + 1 unit)
        assert_eq!(record_end(&buffer, 0).unwrap(), 6);

        let mut truncated = CharBlockArray::with_block_size(8);
        truncated.append(1); // one component...
        truncated.append(5); // ...claiming 5 units
        truncated.append_str("ab"); // only 2 present
        assert!(matches!(
            record_end(&truncated, 0),
            Err(TaxoCacheError::CorruptStream(_))
        ));
    }

    #[test]
    fn test_oversized_component_rejected() {
        let long = "x".repeat(MAX_COMPONENT_UNITS + 1);
        let label = CategoryPath::new(&[long.as_str()]);
        let mut buffer = CharBlockArray::new();
        assert!(matches!(
            serialize(&label, &mut buffer),
            Err(TaxoCacheError::ComponentTooLong(_))
        ));
        // Failed serialize leaves no partial record behind.
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_mix_hash_matches_reference() {
        // h=0 must stay 0 so the empty-root hash lands on bucket 0.
        assert_eq!(mix_hash(0), 0);
        for h in [1, -1, 42, i32::MIN, i32::MAX, 0x1234_5678] {
            let mut expected = h;
            expected ^= (((expected as u32) >> 20) ^ ((expected as u32) >> 12)) as i32;
            expected ^= (((expected as u32) >> 7) ^ ((expected as u32) >> 4)) as i32;
            assert_eq!(mix_hash(h), expected);
        }
    }
}
