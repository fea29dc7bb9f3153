//! Chained overflow hash table for labels that found no free hash-array slot.
//!
//! Entries live in an append-only arena and chain through indices rather than
//! owned nodes, so re-bucketing on growth is pointer-free: the bucket array
//! doubles and every entry is relinked by its stored hash.

use crate::char_block_array::CharBlockArray;
use crate::codec;
use crate::error::Result;
use crate::label::CategoryPath;
use crate::label_to_ordinal::INVALID_ORDINAL;

const LOAD_FACTOR: f32 = 0.75;
const DEFAULT_CAPACITY: usize = 16 * 1024;

/// Chain terminator for bucket and `next` links.
const NIL: i32 = -1;

#[derive(Debug)]
struct Entry {
    offset: i32,
    cid: i32,
    hash: i32,
    next: i32,
}

/// Chained hash map from serialized-label offsets to ordinals.
#[derive(Debug)]
pub struct CollisionMap {
    buckets: Vec<i32>,
    entries: Vec<Entry>,
    capacity: usize,
    threshold: usize,
}

impl CollisionMap {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// `capacity` is rounded up to a power of two so bucket indexing can mask.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        CollisionMap {
            buckets: vec![NIL; capacity],
            entries: Vec::new(),
            capacity,
            threshold: (capacity as f32 * LOAD_FACTOR) as usize,
        }
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up a live label by its finished hash. Returns the mapped ordinal
    /// or [`INVALID_ORDINAL`].
    pub fn get(&self, buffer: &CharBlockArray, label: &CategoryPath, hash: i32) -> i32 {
        let mut cursor = self.buckets[self.bucket_index(hash)];
        while cursor != NIL {
            let entry = &self.entries[cursor as usize];
            if entry.hash == hash && codec::equals_serialized(label, buffer, entry.offset as usize)
            {
                return entry.cid;
            }
            cursor = entry.next;
        }
        INVALID_ORDINAL
    }

    /// Insert a live label, serializing it at the buffer tail. Returns the
    /// existing ordinal if the label is already present, otherwise `cid`.
    pub fn add_label(
        &mut self,
        buffer: &mut CharBlockArray,
        label: &CategoryPath,
        hash: i32,
        cid: i32,
    ) -> Result<i32> {
        let bucket = self.bucket_index(hash);
        let mut cursor = self.buckets[bucket];
        while cursor != NIL {
            let entry = &self.entries[cursor as usize];
            if entry.hash == hash && codec::equals_serialized(label, buffer, entry.offset as usize)
            {
                return Ok(entry.cid);
            }
            cursor = entry.next;
        }

        let offset = buffer.len();
        codec::serialize(label, buffer)?;
        self.insert_entry(bucket, offset as i32, cid, hash);
        Ok(cid)
    }

    /// Insert an already-serialized label by offset; used by rehashing and
    /// stream open, which never re-serialize. Returns the existing ordinal if
    /// an equal record is already chained, otherwise `cid`.
    pub fn add_label_offset(
        &mut self,
        buffer: &CharBlockArray,
        hash: i32,
        offset: usize,
        cid: i32,
    ) -> i32 {
        let bucket = self.bucket_index(hash);
        let mut cursor = self.buckets[bucket];
        while cursor != NIL {
            let entry = &self.entries[cursor as usize];
            if entry.hash == hash
                && codec::equals_serialized_pair(buffer, entry.offset as usize, offset)
            {
                return entry.cid;
            }
            cursor = entry.next;
        }
        self.insert_entry(bucket, offset as i32, cid, hash);
        cid
    }

    /// Every `(offset, cid)` pair, in arena order. Used for the full-table
    /// rehash when the owning table grows.
    pub fn entries(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.entries.iter().map(|e| (e.offset as usize, e.cid))
    }

    fn bucket_index(&self, hash: i32) -> usize {
        (hash & (self.capacity as i32 - 1)) as usize
    }

    fn insert_entry(&mut self, bucket: usize, offset: i32, cid: i32, hash: i32) {
        let index = self.entries.len() as i32;
        self.entries.push(Entry {
            offset,
            cid,
            hash,
            next: self.buckets[bucket],
        });
        self.buckets[bucket] = index;
        if self.entries.len() >= self.threshold {
            self.grow();
        }
    }

    /// Double the bucket array and relink every entry by its stored hash.
    fn grow(&mut self) {
        self.capacity *= 2;
        self.threshold = (self.capacity as f32 * LOAD_FACTOR) as usize;
        self.buckets = vec![NIL; self.capacity];
        for i in 0..self.entries.len() {
            let bucket = self.bucket_index(self.entries[i].hash);
            self.entries[i].next = self.buckets[bucket];
            self.buckets[bucket] = i as i32;
        }
    }
}

impl Default for CollisionMap {
    fn default() -> Self {
        Self::new()
    }
}
