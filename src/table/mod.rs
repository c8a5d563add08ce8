//! Table Module
//!
//! A table is a directory of segment files sharing one name.
//!
//! ## Layering
//! ```text
//!   CachingTable ──(miss)──▶ SegmentTable ──▶ TableIndex ──▶ Segment
//!        │
//!        └── BoundedCache
//! ```
//!
//! Both layers implement [`Table`], so a database holds either one behind the
//! same interface and callers cannot tell whether a cache is present.

mod caching;
mod segment_table;

use bytes::Bytes;

use crate::error::Result;

pub use caching::CachingTable;
pub use segment_table::SegmentTable;

/// Key-value operations on a single table
pub trait Table: Send {
    fn name(&self) -> &str;

    /// Store `value` under `key` in the active segment
    fn write(&mut self, key: &str, value: &[u8]) -> Result<()>;

    /// Latest value of `key`, `Ok(None)` if never written or deleted
    fn read(&mut self, key: &str) -> Result<Option<Bytes>>;

    /// Tombstone `key`, returning the value it held
    ///
    /// Fails with `KeyNotFound` if the key has no live value.
    fn delete(&mut self, key: &str) -> Result<Bytes>;
}
