//! TableScan stage

use std::path::{Path, PathBuf};

use crate::config::TableOptions;
use crate::error::Result;
use crate::storage::{Segment, SegmentId, TableIndex};
use crate::table::SegmentTable;

use super::segment::{replay_segment, SegmentContext};
use super::{list_entries, require_dir, EntryKind, RecoveryStats};

/// Replay state of one table directory
#[derive(Debug)]
pub struct TableContext {
    name: String,
    path: PathBuf,
    index: TableIndex,
    /// Replayed segments, oldest first
    segments: Vec<Segment>,
    records: u64,
    options: TableOptions,
}

impl TableContext {
    pub fn new(name: impl Into<String>, path: PathBuf, options: TableOptions) -> Self {
        Self {
            name: name.into(),
            path,
            index: TableIndex::new(),
            segments: Vec::new(),
            records: 0,
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fold a replayed segment in as the newest one
    ///
    /// Every key the segment wrote or tombstoned now points at it.
    pub fn with_segment(mut self, replayed: SegmentContext) -> Self {
        let id = SegmentId::new(self.segments.len());
        self.records += replayed.records();
        let (segment, keys) = replayed.into_segment(&self.options);

        for key in &keys {
            self.index.update(key, id);
        }
        self.segments.push(segment);
        self
    }

    pub fn stats(&self) -> RecoveryStats {
        RecoveryStats {
            tables: 1,
            segments: self.segments.len(),
            records: self.records,
        }
    }

    /// The recovered table; the newest segment becomes the active one
    pub fn into_table(self) -> SegmentTable {
        SegmentTable::from_recovered(self.name, self.path, self.index, self.segments, self.options)
    }
}

/// Replay every segment file of the table in name (= creation) order
pub fn recover_table(context: TableContext) -> Result<(SegmentTable, RecoveryStats)> {
    let path = context.path.clone();
    require_dir(&path)?;

    let mut context = context;
    for segment_name in list_entries(&path, EntryKind::File)? {
        let segment_path = path.join(&segment_name);
        let replayed = replay_segment(SegmentContext::new(segment_name, segment_path))?;
        context = context.with_segment(replayed);
    }

    let stats = context.stats();
    tracing::debug!(
        "Recovered table {}: {} segments, {} records, {} keys",
        context.name,
        stats.segments,
        stats.records,
        context.index.len()
    );

    Ok((context.into_table(), stats))
}
