//! Segment
//!
//! One append-only log file of a table.
//!
//! A segment accepts writes until its size reaches the configured maximum,
//! after which it is read-only forever. Every operation opens its own file
//! handle and drops it before returning.
//!
//! A failed append is cut back off the file, so the file length always
//! equals `size`. If the cut itself fails the segment is sealed and takes no
//! more writes.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use crate::config::TableOptions;
use crate::error::{Result, SegkvError};

use super::{Record, SegmentIndex};

/// An append-only segment file with its offset index
#[derive(Debug)]
pub struct Segment {
    /// File name, `{table}_{stamp}`
    name: String,
    /// Full path to the segment file
    path: PathBuf,
    /// Sum of encoded record lengths (equals the file length)
    size: u64,
    /// Size at which the segment stops accepting writes
    max_size: u64,
    /// fsync after each append
    sync_writes: bool,
    /// Key → offset of the key's latest record in this file
    index: SegmentIndex,
    /// Set when a failed append could not be rolled back
    sealed: bool,
}

impl Segment {
    /// Create a new, empty segment in `table_path`
    ///
    /// The backing file is created if it does not exist yet; an existing file
    /// is left untouched.
    pub fn create(name: impl Into<String>, table_path: &Path, options: &TableOptions) -> Result<Self> {
        let name = name.into();
        let path = table_path.join(&name);

        OpenOptions::new().create(true).append(true).open(&path)?;
        if options.sync_writes {
            // Persist the new directory entry, not just the file contents
            File::open(table_path)?.sync_all()?;
        }

        tracing::debug!("Created segment {}", path.display());

        Ok(Self {
            name,
            path,
            size: 0,
            max_size: options.max_segment_size,
            sync_writes: options.sync_writes,
            index: SegmentIndex::new(),
            sealed: false,
        })
    }

    /// Rebuild a segment from a replayed index and size
    ///
    /// Used by recovery only: the file is neither truncated nor rewritten.
    pub fn from_recovered(
        name: impl Into<String>,
        path: PathBuf,
        index: SegmentIndex,
        size: u64,
        options: &TableOptions,
    ) -> Self {
        Self {
            name: name.into(),
            path,
            size,
            max_size: options.max_segment_size,
            sync_writes: options.sync_writes,
            index,
            sealed: false,
        }
    }

    /// Append a value for `key`
    ///
    /// Returns `false` without any I/O if the segment is read-only.
    pub fn write(&mut self, key: &str, value: &[u8]) -> Result<bool> {
        self.append(
            key,
            Record::put(Bytes::copy_from_slice(key.as_bytes()), Bytes::copy_from_slice(value)),
        )
    }

    /// Append a tombstone for `key`
    ///
    /// Same contract as [`Segment::write`].
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        self.append(key, Record::tombstone(Bytes::copy_from_slice(key.as_bytes())))
    }

    fn append(&mut self, key: &str, record: Record) -> Result<bool> {
        if self.is_read_only() {
            return Ok(false);
        }

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        let sync_writes = self.sync_writes;
        self.append_with(key, &record, |record| {
            let written = record.write_to(&mut file)?;
            if sync_writes {
                file.sync_data()?;
            }
            Ok(written)
        })
    }

    /// Account for one record appended by `write`
    ///
    /// On error the file is truncated back to `size` before the error is
    /// returned; the index and size are left as they were.
    pub(crate) fn append_with<F>(&mut self, key: &str, record: &Record, write: F) -> Result<bool>
    where
        F: FnOnce(&Record) -> Result<u64>,
    {
        let written = match write(record) {
            Ok(written) => written,
            Err(e) => {
                self.roll_back();
                return Err(e);
            }
        };

        self.index.update(key, self.size);
        self.size += written;

        if self.is_read_only() {
            tracing::debug!("Segment {} is full ({} bytes), now read-only", self.name, self.size);
        }

        Ok(true)
    }

    fn roll_back(&mut self) {
        let truncated = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .and_then(|file| file.set_len(self.size));

        if let Err(e) = truncated {
            tracing::error!(
                "Segment {} could not drop a partial record ({}), sealing it",
                self.name,
                e
            );
            self.sealed = true;
        }
    }

    /// Read the latest value of `key` from this segment
    ///
    /// Returns:
    /// - `Ok(Some(value))`: key's latest record here is a value
    /// - `Ok(None)`: key unknown here, or its latest record is a tombstone
    /// - `Err(_)`: seek/decode failure, or the index points at a bad record
    pub fn read(&self, key: &str) -> Result<Option<Bytes>> {
        let offset = match self.index.offset_of(key) {
            Some(offset) => offset,
            None => return Ok(None),
        };

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut reader = BufReader::new(file);

        let record = Record::read_from(&mut reader)?.ok_or_else(|| {
            SegkvError::Corruption(format!(
                "segment {} has no record at offset {}",
                self.name, offset
            ))
        })?;

        if record.key().as_ref() != key.as_bytes() {
            return Err(SegkvError::Corruption(format!(
                "segment {} offset {} holds a different key",
                self.name, offset
            )));
        }

        Ok(record.into_value())
    }

    /// True once the size has reached the maximum segment size, or the
    /// segment was sealed after a failed append
    pub fn is_read_only(&self) -> bool {
        self.sealed || self.size >= self.max_size
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn index(&self) -> &SegmentIndex {
        &self.index
    }
}

// =============================================================================
// Naming
// =============================================================================

/// `{table}_{stamp}` with a zero-padded stamp, so names sort by stamp
pub fn segment_name(table: &str, stamp: u64) -> String {
    format!("{}_{:020}", table, stamp)
}

/// "users_00000001700000000000" → Some(1700000000000)
pub fn parse_segment_stamp(table: &str, name: &str) -> Option<u64> {
    name.strip_prefix(table)?.strip_prefix('_')?.parse().ok()
}

/// Name for a table's next segment
///
/// The stamp is the wall clock in milliseconds, bumped past the previous
/// segment's stamp if needed, so names stay strictly increasing within a
/// table even inside one clock tick or after a restart.
pub fn next_segment_name(table: &str, previous: Option<&str>) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let floor = previous
        .and_then(|name| parse_segment_stamp(table, name))
        .map(|stamp| stamp.saturating_add(1))
        .unwrap_or(0);

    segment_name(table, now.max(floor))
}
