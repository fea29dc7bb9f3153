//! Compact label-to-ordinal table: the "complete" cache's core structure.
//!
//! Layout: a fixed number of open-addressing hash-array generations (each
//! half the capacity of the one before it), a chained collision map for
//! overflow, and an append-only char repository holding every serialized
//! label. Slots store 32-bit repository offsets, never label objects, which
//! is where the memory compactness comes from.
//!
//! Lookup correctness depends on one invariant: insertion always claims the
//! first empty slot scanning generations in fixed order, so a lookup that
//! hits an empty slot can stop immediately — the label cannot be stored any
//! deeper.

use std::io::{Read, Write};

use tracing::debug;

use crate::char_block_array::CharBlockArray;
use crate::codec;
use crate::collision_map::CollisionMap;
use crate::error::{Result, TaxoCacheError};
use crate::label::CategoryPath;
use crate::label_to_ordinal::{LabelToOrdinal, INVALID_ORDINAL};

/// One hash-array generation: parallel `offsets`/`cids` arrays. Offset 0
/// doubles as the empty-slot sentinel, which is why construction burns a
/// record at repository offset 0.
#[derive(Debug)]
struct HashArray {
    offsets: Vec<i32>,
    cids: Vec<i32>,
}

impl HashArray {
    fn new(capacity: usize) -> Self {
        HashArray {
            offsets: vec![0; capacity],
            cids: vec![0; capacity],
        }
    }

    fn capacity(&self) -> usize {
        self.offsets.len()
    }

    fn index_for(&self, hash: i32) -> usize {
        (hash & (self.offsets.len() as i32 - 1)) as usize
    }
}

/// Growable multi-generation hash table mapping labels to ordinals.
#[derive(Debug)]
pub struct CompactLabelToOrdinal {
    counter: i32,
    capacity: usize,
    hash_arrays: Vec<HashArray>,
    collision_map: CollisionMap,
    label_repository: CharBlockArray,
    load_factor: f32,
    threshold: usize,
}

impl CompactLabelToOrdinal {
    /// Create an empty table. `initial_capacity` is rounded up to a power of
    /// two for generation 0; generation `i` gets half the capacity of
    /// generation `i-1`.
    ///
    /// # Panics
    ///
    /// Panics if `num_hash_arrays` is zero.
    pub fn new(initial_capacity: usize, load_factor: f32, num_hash_arrays: usize) -> Self {
        assert!(num_hash_arrays >= 1, "need at least one hash array");
        let capacity = initial_capacity.max(2).next_power_of_two();

        let hash_arrays = (0..num_hash_arrays)
            .map(|i| HashArray::new((capacity >> i).max(1)))
            .collect();

        let mut label_repository = CharBlockArray::new();
        // Burn repository offset 0 with the serialized empty (root) record so
        // that offset 0 can remain the empty-slot sentinel everywhere else.
        label_repository.append(0);

        CompactLabelToOrdinal {
            counter: 0,
            capacity,
            hash_arrays,
            collision_map: CollisionMap::new(),
            label_repository,
            load_factor,
            threshold: (capacity as f32 * load_factor) as usize,
        }
    }

    /// Write `[i32 LE counter][label repository as LE u16 pairs]`.
    pub fn flush<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(&self.counter.to_le_bytes())?;
        self.label_repository.write_to(out)?;
        out.flush()?;
        debug!(
            "Flushed compact table: counter {}, {} repository units",
            self.counter,
            self.label_repository.len()
        );
        Ok(())
    }

    /// Rebuild a table from a stream produced by [`CompactLabelToOrdinal::flush`].
    ///
    /// The stream stores no per-entry ordinals: records were serialized in
    /// insertion order, so walking them from offset 1 (past the burned root
    /// record) and assigning cids 0, 1, 2, … reconstructs the mapping.
    pub fn open<R: Read>(input: &mut R, load_factor: f32, num_hash_arrays: usize) -> Result<Self> {
        let mut counter_bytes = [0u8; 4];
        input.read_exact(&mut counter_bytes)?;
        let counter = i32::from_le_bytes(counter_bytes);
        if counter < 0 {
            return Err(TaxoCacheError::CorruptStream(format!(
                "negative ordinal counter {}",
                counter
            )));
        }

        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        if bytes.len() % 2 != 0 {
            return Err(TaxoCacheError::CorruptStream(
                "odd byte count in label repository".to_string(),
            ));
        }
        let repository = CharBlockArray::from_le_bytes(&bytes);
        if repository.is_empty() || repository.char_at(0) != 0 {
            return Err(TaxoCacheError::CorruptStream(
                "missing root record at offset 0".to_string(),
            ));
        }

        let initial_capacity = (counter as usize).max(16).next_power_of_two();
        let mut table = Self::new(initial_capacity, load_factor, num_hash_arrays);
        table.counter = counter;
        table.label_repository = repository;

        let mut offset = 1usize;
        let mut cid = 0i32;
        while offset < table.label_repository.len() {
            let end = codec::record_end(&table.label_repository, offset)?;
            let hash =
                codec::mix_hash(codec::hash_of_serialized(&table.label_repository, offset));
            table.add_label_offset(hash, offset, cid);
            cid += 1;
            offset = end;
        }
        debug!("Opened compact table: {} records, counter {}", cid, counter);
        Ok(table)
    }

    /// Number of entries that overflowed into the collision map.
    pub fn collision_map_size(&self) -> usize {
        self.collision_map.size()
    }

    /// Try to place `label` in generation `level`. `Ok(true)` means the slot
    /// was claimed or already held this label with the same ordinal.
    fn try_hash_array_add(
        &mut self,
        level: usize,
        label: &CategoryPath,
        hash: i32,
        ordinal: i32,
    ) -> Result<bool> {
        let index = self.hash_arrays[level].index_for(hash);
        let offset = self.hash_arrays[level].offsets[index];

        if offset == 0 {
            let new_offset = self.label_repository.len();
            codec::serialize(label, &mut self.label_repository)?;
            let array = &mut self.hash_arrays[level];
            array.offsets[index] = new_offset as i32;
            array.cids[index] = ordinal;
            return Ok(true);
        }

        if codec::equals_serialized(label, &self.label_repository, offset as usize) {
            let existing = self.hash_arrays[level].cids[index];
            if existing != ordinal {
                return Err(TaxoCacheError::OrdinalConflict {
                    existing,
                    requested: ordinal,
                });
            }
            return Ok(true);
        }

        Ok(false)
    }

    /// Offset-based insert used by rehashing and stream open: the label is
    /// already serialized, only its slot changes.
    fn add_label_offset(&mut self, hash: i32, offset: usize, cid: i32) {
        for array in &mut self.hash_arrays {
            let index = array.index_for(hash);
            if array.offsets[index] == 0 {
                array.offsets[index] = offset as i32;
                array.cids[index] = cid;
                return;
            }
        }
        self.collision_map
            .add_label_offset(&self.label_repository, hash, offset, cid);
    }

    /// Double capacity and redistribute.
    ///
    /// A fresh generation 0 is prepended, every generation shifts one level
    /// deeper and the old deepest is detached. Shifted entries migrate into
    /// any shallower slot that is now free (hash recomputed straight from the
    /// stored offset); detached survivors and the entire old collision map
    /// are reinserted through the offset-based path, which lets previously
    /// colliding entries land in the doubled hash arrays.
    fn grow(&mut self) {
        let mut shifted = std::mem::take(&mut self.hash_arrays);
        let detached = shifted.pop();
        self.capacity *= 2;
        self.threshold = (self.capacity as f32 * self.load_factor) as usize;
        debug!(
            "Growing compact table to capacity {} ({} collision entries)",
            self.capacity,
            self.collision_map.size()
        );

        self.hash_arrays.push(HashArray::new(self.capacity));
        self.hash_arrays.extend(shifted);

        for i in 1..self.hash_arrays.len() {
            let (shallower, rest) = self.hash_arrays.split_at_mut(i);
            let source = &mut rest[0];
            for k in 0..source.offsets.len() {
                let offset = source.offsets[k];
                if offset == 0 {
                    continue;
                }
                let hash = codec::mix_hash(codec::hash_of_serialized(
                    &self.label_repository,
                    offset as usize,
                ));
                for target in shallower.iter_mut() {
                    let index = target.index_for(hash);
                    if target.offsets[index] == 0 {
                        target.offsets[index] = offset;
                        target.cids[index] = source.cids[k];
                        source.offsets[k] = 0;
                        break;
                    }
                }
            }
        }

        if let Some(detached) = detached {
            for k in 0..detached.offsets.len() {
                let offset = detached.offsets[k];
                if offset == 0 {
                    continue;
                }
                let hash = codec::mix_hash(codec::hash_of_serialized(
                    &self.label_repository,
                    offset as usize,
                ));
                self.add_label_offset(hash, offset as usize, detached.cids[k]);
            }
        }

        let old_capacity = self.collision_map.capacity();
        let old_map = std::mem::replace(
            &mut self.collision_map,
            CollisionMap::with_capacity(old_capacity),
        );
        for (offset, cid) in old_map.entries() {
            let hash = codec::mix_hash(codec::hash_of_serialized(&self.label_repository, offset));
            self.add_label_offset(hash, offset, cid);
        }
    }
}

impl LabelToOrdinal for CompactLabelToOrdinal {
    fn get_next_ordinal(&mut self) -> i32 {
        let next = self.counter;
        self.counter += 1;
        next
    }

    fn max_ordinal(&self) -> i32 {
        self.counter
    }

    fn add_label(&mut self, label: &CategoryPath, ordinal: i32) -> Result<()> {
        if self.collision_map.size() > self.threshold {
            self.grow();
        }

        let hash = codec::mix_hash(label.hash_code());
        for level in 0..self.hash_arrays.len() {
            if self.try_hash_array_add(level, label, hash, ordinal)? {
                return Ok(());
            }
        }

        let existing =
            self.collision_map
                .add_label(&mut self.label_repository, label, hash, ordinal)?;
        if existing != ordinal {
            return Err(TaxoCacheError::OrdinalConflict {
                existing,
                requested: ordinal,
            });
        }
        Ok(())
    }

    fn get_ordinal(&self, label: &CategoryPath) -> i32 {
        let hash = codec::mix_hash(label.hash_code());
        for array in &self.hash_arrays {
            let index = array.index_for(hash);
            let offset = array.offsets[index];
            if offset == 0 {
                // Insertion fills the first free slot in this same scan
                // order, so an empty slot proves the label is not stored
                // here or deeper.
                return INVALID_ORDINAL;
            }
            if codec::equals_serialized(label, &self.label_repository, offset as usize) {
                return array.cids[index];
            }
        }
        self.collision_map.get(&self.label_repository, label, hash)
    }
}
