//! In-memory indexes
//!
//! Two levels of lookup:
//! - [`SegmentIndex`]: key → byte offset of its latest record inside one segment
//! - [`TableIndex`]: key → segment holding the key's latest write or tombstone

use std::collections::HashMap;

/// Key → record offset within a single segment file
#[derive(Debug, Default, Clone)]
pub struct SegmentIndex {
    offsets: HashMap<String, u64>,
}

impl SegmentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `key` at the record starting at `offset` (last write wins)
    pub fn update(&mut self, key: &str, offset: u64) {
        match self.offsets.get_mut(key) {
            Some(existing) => *existing = offset,
            None => {
                self.offsets.insert(key.to_string(), offset);
            }
        }
    }

    pub fn offset_of(&self, key: &str) -> Option<u64> {
        self.offsets.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.offsets.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.offsets.keys().map(String::as_str)
    }
}

/// Position of a segment within its table, oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(usize);

impl SegmentId {
    pub fn new(position: usize) -> Self {
        Self(position)
    }

    pub fn position(self) -> usize {
        self.0
    }
}

/// Key → owning segment
#[derive(Debug, Default, Clone)]
pub struct TableIndex {
    owners: HashMap<String, SegmentId>,
}

impl TableIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repoint `key` at `segment`
    pub fn update(&mut self, key: &str, segment: SegmentId) {
        match self.owners.get_mut(key) {
            Some(existing) => *existing = segment,
            None => {
                self.owners.insert(key.to_string(), segment);
            }
        }
    }

    pub fn segment_for(&self, key: &str) -> Option<SegmentId> {
        self.owners.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.owners.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
