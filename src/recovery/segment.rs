//! SegmentReplay stage

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::config::TableOptions;
use crate::error::{Result, SegkvError};
use crate::storage::{Record, Segment, SegmentIndex};

/// Replay state of one segment file
#[derive(Debug)]
pub struct SegmentContext {
    name: String,
    path: PathBuf,
    index: SegmentIndex,
    /// Sum of decoded record lengths so far
    size: u64,
    /// Every key seen in this segment, values and tombstones alike
    keys: HashSet<String>,
    records: u64,
}

impl SegmentContext {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
            index: SegmentIndex::new(),
            size: 0,
            keys: HashSet::new(),
            records: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> &SegmentIndex {
        &self.index
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn keys(&self) -> &HashSet<String> {
        &self.keys
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    /// The recovered segment and the keys it wrote
    pub fn into_segment(self, options: &TableOptions) -> (Segment, HashSet<String>) {
        let segment = Segment::from_recovered(self.name, self.path, self.index, self.size, options);
        (segment, self.keys)
    }
}

/// Decode every record of the segment file, from the start
///
/// Each key's offset is the start of its last record; the size is the sum of
/// encoded record lengths, exactly as live writes account for it.
pub fn replay_segment(context: SegmentContext) -> Result<SegmentContext> {
    let path = context.path.clone();
    let fail = |e: SegkvError| SegkvError::recovery(&path, e);

    let file = File::open(&path).map_err(|e| fail(e.into()))?;
    let length = file.metadata().map_err(|e| fail(e.into()))?.len();

    let mut context = context;
    if length == 0 {
        tracing::debug!("Segment {} is empty", context.name);
        return Ok(context);
    }

    let mut reader = BufReader::new(file);
    while let Some(record) = Record::read_from(&mut reader).map_err(fail)? {
        let key = String::from_utf8(record.key().to_vec()).map_err(|_| {
            fail(SegkvError::Corruption(format!(
                "record at offset {} has a non UTF-8 key",
                context.size
            )))
        })?;

        context.index.update(&key, context.size);
        context.size += record.size();
        context.records += 1;
        context.keys.insert(key);
    }

    tracing::debug!(
        "Replayed segment {}: {} records, {} keys, {} bytes",
        context.name,
        context.records,
        context.keys.len(),
        context.size
    );

    Ok(context)
}
