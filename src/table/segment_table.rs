//! Segment-backed table
//!
//! Routes writes to the active segment, rolling over when it fills up, and
//! reads/deletes through the table index.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::config::TableOptions;
use crate::error::{Result, SegkvError};
use crate::storage::{next_segment_name, Segment, SegmentId, TableIndex};

use super::Table;

/// A table stored as an ordered list of segments
///
/// ## Invariants
/// - `segments` is ordered oldest → newest (by name, which encodes creation order)
/// - only the last segment may be writable; it is the active segment
/// - `index` points every known key at the segment holding its latest record
#[derive(Debug)]
pub struct SegmentTable {
    name: String,
    path: PathBuf,
    index: TableIndex,
    segments: Vec<Segment>,
    options: TableOptions,
}

impl SegmentTable {
    /// Create the table directory under `database_path` and an empty table
    pub fn create(name: &str, database_path: &Path, options: TableOptions) -> Result<Self> {
        let path = database_path.join(name);
        fs::create_dir_all(&path)?;

        Ok(Self {
            name: name.to_string(),
            path,
            index: TableIndex::new(),
            segments: Vec::new(),
            options,
        })
    }

    /// Rebuild a table from replayed segments (oldest first) and their index
    pub fn from_recovered(
        name: impl Into<String>,
        path: PathBuf,
        index: TableIndex,
        segments: Vec<Segment>,
        options: TableOptions,
    ) -> Self {
        Self {
            name: name.into(),
            path,
            index,
            segments,
            options,
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> &TableIndex {
        &self.index
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.position())
    }

    /// The segment new writes go to, if one exists yet
    pub fn active_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Name of the segment holding `key`'s latest record
    pub fn segment_name_for(&self, key: &str) -> Option<&str> {
        self.index
            .segment_for(key)
            .and_then(|id| self.segment(id))
            .map(Segment::name)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Make sure the active segment accepts writes, creating a new one if needed
    fn writable_segment(&mut self) -> Result<SegmentId> {
        let needs_new = self.segments.last().map_or(true, Segment::is_read_only);

        if needs_new {
            let previous = self.segments.last().map(Segment::name);
            let name = next_segment_name(&self.name, previous);
            if let Some(previous) = previous {
                tracing::debug!("Table {} rolling over from {} to {}", self.name, previous, name);
            }

            let segment = Segment::create(name, &self.path, &self.options)?;
            self.segments.push(segment);
        }

        Ok(SegmentId::new(self.segments.len() - 1))
    }

    fn lookup(&self, key: &str) -> Result<Option<Bytes>> {
        let id = match self.index.segment_for(key) {
            Some(id) => id,
            None => return Ok(None),
        };

        let segment = self.segment(id).ok_or_else(|| {
            SegkvError::Corruption(format!(
                "table {} indexes key {} in unknown segment #{}",
                self.name,
                key,
                id.position()
            ))
        })?;

        segment.read(key)
    }
}

impl Table for SegmentTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let id = self.writable_segment()?;
        let segment = &mut self.segments[id.position()];

        if !segment.write(key, value)? {
            return Err(SegkvError::ReadOnlySegment(segment.name().to_string()));
        }

        self.index.update(key, id);
        Ok(())
    }

    fn read(&mut self, key: &str) -> Result<Option<Bytes>> {
        self.lookup(key)
    }

    fn delete(&mut self, key: &str) -> Result<Bytes> {
        let previous = self
            .lookup(key)?
            .ok_or_else(|| SegkvError::KeyNotFound(key.to_string()))?;

        // The tombstone goes to the active segment, like any other write.
        let id = self.writable_segment()?;
        let segment = &mut self.segments[id.position()];

        if !segment.delete(key)? {
            return Err(SegkvError::ReadOnlySegment(segment.name().to_string()));
        }

        self.index.update(key, id);
        Ok(previous)
    }
}
