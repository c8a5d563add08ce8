//! Storage Module
//!
//! Append-only log segments and the indexes that locate keys inside them.
//!
//! ## Responsibilities
//! - Encode/decode single records
//! - Append records to the active segment, freeze it once full
//! - Positioned reads through the per-segment offset index
//! - Map every key to the segment holding its latest state
//!
//! ## Segment File Format
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │ Record 1                                       │
//! │ ┌────────────┬────────────┬───────┬─────────┐  │
//! │ │ KeyLen (4) │ ValLen (4) │  Key  │  Value  │  │
//! │ └────────────┴────────────┴───────┴─────────┘  │
//! ├────────────────────────────────────────────────┤
//! │ Record 2                                       │
//! │   ... repeated until end of file ...           │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! Lengths are big-endian `i32`. `ValLen = -1` marks a tombstone and is
//! followed by no value bytes. There is no header or footer: a segment is
//! just a concatenation of records, so the file length always equals the
//! segment's size counter.

mod index;
mod record;
mod segment;

pub use index::{SegmentId, SegmentIndex, TableIndex};
pub use record::{Record, RECORD_HEADER_SIZE, TOMBSTONE_MARKER};
pub use segment::{next_segment_name, parse_segment_stamp, segment_name, Segment};
