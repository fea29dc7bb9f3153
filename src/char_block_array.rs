//! Growable, append-only character storage with permanently stable offsets.
//!
//! Storage is an ordered list of fixed-capacity blocks of UTF-16 code units.
//! A block is filled completely before the next one is appended and is never
//! reallocated or moved afterwards, so a logical offset handed out once stays
//! valid for the lifetime of the buffer. This is what lets the label-ordinal
//! structures store plain `i32` offsets instead of owned strings.

use std::io::Write;

/// Default block capacity in UTF-16 units.
pub(crate) const DEFAULT_BLOCK_SIZE: usize = 32 * 1024;

/// Append-only block-structured buffer of UTF-16 code units.
#[derive(Debug)]
pub struct CharBlockArray {
    blocks: Vec<Vec<u16>>,
    block_size: usize,
    len: usize,
}

impl CharBlockArray {
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }

    /// Small block sizes force multi-block spans in tests.
    pub(crate) fn with_block_size(block_size: usize) -> Self {
        debug_assert!(block_size > 0);
        CharBlockArray {
            blocks: Vec::new(),
            block_size,
            len: 0,
        }
    }

    /// Total number of units appended so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a single UTF-16 unit. Amortized O(1).
    pub fn append(&mut self, unit: u16) {
        self.tail_block().push(unit);
        self.len += 1;
    }

    /// Append a run of UTF-16 units, spilling across block boundaries.
    pub fn append_slice(&mut self, mut units: &[u16]) {
        while !units.is_empty() {
            let block_size = self.block_size;
            let tail = self.tail_block();
            let room = block_size - tail.len();
            let take = room.min(units.len());
            tail.extend_from_slice(&units[..take]);
            self.len += take;
            units = &units[take..];
        }
    }

    /// Append a string as its UTF-16 encoding.
    pub fn append_str(&mut self, s: &str) {
        for unit in s.encode_utf16() {
            self.append(unit);
        }
    }

    /// Random access by logical offset. O(1).
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn char_at(&self, index: usize) -> u16 {
        self.blocks[index / self.block_size][index % self.block_size]
    }

    /// Flat copy of the units in `[start, end)`, possibly spanning blocks.
    pub fn sub_sequence(&self, start: usize, end: usize) -> Vec<u16> {
        assert!(start <= end && end <= self.len);
        (start..end).map(|i| self.char_at(i)).collect()
    }

    /// Stream every unit as little-endian byte pairs, block by block.
    pub(crate) fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for block in &self.blocks {
            for &unit in block {
                out.write_all(&unit.to_le_bytes())?;
            }
        }
        Ok(())
    }

    /// Rebuild a buffer from the little-endian byte stream produced by
    /// [`CharBlockArray::write_to`]. The caller has already checked that
    /// `bytes.len()` is even.
    pub(crate) fn from_le_bytes(bytes: &[u8]) -> Self {
        let mut buffer = CharBlockArray::new();
        for pair in bytes.chunks_exact(2) {
            buffer.append(u16::from_le_bytes([pair[0], pair[1]]));
        }
        buffer
    }

    fn tail_block(&mut self) -> &mut Vec<u16> {
        let needs_block = match self.blocks.last() {
            Some(block) => block.len() == self.block_size,
            None => true,
        };
        if needs_block {
            self.blocks.push(Vec::with_capacity(self.block_size));
        }
        // Just pushed or verified non-full.
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }
}

impl Default for CharBlockArray {
    fn default() -> Self {
        Self::new()
    }
}
