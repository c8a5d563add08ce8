//! Tests for Segment
//!
//! These tests verify:
//! - Creating a segment creates its file
//! - Writes, tombstones and positioned reads
//! - Offsets and size accounting against the file
//! - Read-only cutover at the maximum size
//! - Segment naming order

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use segkv::config::TableOptions;
use segkv::storage::{
    next_segment_name, parse_segment_stamp, segment_name, Segment, SegmentIndex,
};
use segkv::SegkvError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().to_path_buf();
    (temp_dir, path)
}

fn options_with_max_size(max_segment_size: u64) -> TableOptions {
    TableOptions {
        max_segment_size,
        ..TableOptions::default()
    }
}

fn file_len(segment: &Segment) -> u64 {
    fs::metadata(segment.path()).unwrap().len()
}

// =============================================================================
// Create Tests
// =============================================================================

#[test]
fn test_create_makes_empty_file() {
    let (_temp, dir) = setup_temp_dir();

    let segment = Segment::create("t_1", &dir, &TableOptions::default()).unwrap();

    assert!(dir.join("t_1").is_file());
    assert_eq!(segment.name(), "t_1");
    assert_eq!(segment.size(), 0);
    assert!(segment.index().is_empty());
    assert!(!segment.is_read_only());
}

#[test]
fn test_create_does_not_truncate_existing_file() {
    let (_temp, dir) = setup_temp_dir();
    fs::write(dir.join("t_1"), b"existing").unwrap();

    let _segment = Segment::create("t_1", &dir, &TableOptions::default()).unwrap();

    assert_eq!(fs::read(dir.join("t_1")).unwrap(), b"existing");
}

#[test]
fn test_create_in_missing_directory_fails() {
    let (_temp, dir) = setup_temp_dir();

    let result = Segment::create("t_1", &dir.join("missing"), &TableOptions::default());

    assert!(matches!(result, Err(SegkvError::Io(_))));
}

#[test]
fn test_create_and_write_with_sync_writes() {
    let (_temp, dir) = setup_temp_dir();
    let options = TableOptions {
        sync_writes: true,
        ..TableOptions::default()
    };

    let mut segment = Segment::create("t_1", &dir, &options).unwrap();
    assert!(segment.write("k", b"durable").unwrap());
    assert!(segment.delete("k").unwrap());

    assert!(dir.join("t_1").is_file());
    assert_eq!(file_len(&segment), segment.size());
    assert!(segment.read("k").unwrap().is_none());
}

// =============================================================================
// Write / Read Tests
// =============================================================================

#[test]
fn test_write_then_read() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::create("t_1", &dir, &TableOptions::default()).unwrap();

    assert!(segment.write("hello", b"world").unwrap());

    assert_eq!(segment.read("hello").unwrap().unwrap().as_ref(), b"world");
}

#[test]
fn test_read_unknown_key() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::create("t_1", &dir, &TableOptions::default()).unwrap();
    segment.write("present", b"1").unwrap();

    assert!(segment.read("absent").unwrap().is_none());
}

#[test]
fn test_overwrite_returns_latest() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::create("t_1", &dir, &TableOptions::default()).unwrap();

    segment.write("k", b"v1").unwrap();
    segment.write("other", b"x").unwrap();
    segment.write("k", b"v2").unwrap();

    assert_eq!(segment.read("k").unwrap().unwrap().as_ref(), b"v2");
    assert_eq!(segment.read("other").unwrap().unwrap().as_ref(), b"x");
}

#[test]
fn test_delete_writes_tombstone() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::create("t_1", &dir, &TableOptions::default()).unwrap();

    segment.write("k", b"v").unwrap();
    assert!(segment.delete("k").unwrap());

    assert!(segment.read("k").unwrap().is_none());
    // The key stays indexed: it points at the tombstone
    assert!(segment.index().contains("k"));
}

#[test]
fn test_offsets_and_size_follow_records() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::create("t_1", &dir, &TableOptions::default()).unwrap();

    segment.write("a", b"123").unwrap(); // 8 + 1 + 3 = 12
    segment.delete("bb").unwrap(); // 8 + 2 = 10
    segment.write("a", b"").unwrap(); // 8 + 1 = 9

    assert_eq!(segment.index().offset_of("a"), Some(22));
    assert_eq!(segment.index().offset_of("bb"), Some(12));
    assert_eq!(segment.size(), 31);
    assert_eq!(file_len(&segment), segment.size());
}

// =============================================================================
// Read-Only Tests
// =============================================================================

#[test]
fn test_becomes_read_only_at_max_size() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::create("t_1", &dir, &options_with_max_size(30)).unwrap();

    segment.write("k1", b"0123456789").unwrap(); // 20 bytes
    assert!(!segment.is_read_only());

    segment.write("k2", b"01").unwrap(); // 12 bytes, total 32
    assert!(segment.is_read_only());
}

#[test]
fn test_read_only_refuses_writes_without_io() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::create("t_1", &dir, &options_with_max_size(10)).unwrap();

    assert!(segment.write("key", b"value").unwrap());
    assert!(segment.is_read_only());
    let size = segment.size();

    assert!(!segment.write("key", b"new").unwrap());
    assert!(!segment.delete("key").unwrap());

    assert_eq!(segment.size(), size);
    assert_eq!(file_len(&segment), size);
    assert_eq!(segment.read("key").unwrap().unwrap().as_ref(), b"value");
}

#[test]
fn test_exact_max_size_is_read_only() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::create("t_1", &dir, &options_with_max_size(10)).unwrap();

    segment.write("k", b"v").unwrap(); // exactly 10

    assert_eq!(segment.size(), 10);
    assert!(segment.is_read_only());
}

// =============================================================================
// Recovered Segment Tests
// =============================================================================

#[test]
fn test_from_recovered_reads_existing_file() {
    let (_temp, dir) = setup_temp_dir();
    let path = {
        let mut segment = Segment::create("t_1", &dir, &TableOptions::default()).unwrap();
        segment.write("a", b"1").unwrap();
        segment.write("b", b"2").unwrap();
        segment.path().to_path_buf()
    };

    let mut index = SegmentIndex::new();
    index.update("a", 0);
    index.update("b", 10);
    let segment =
        Segment::from_recovered("t_1", path, index, 20, &TableOptions::default());

    assert_eq!(segment.read("b").unwrap().unwrap().as_ref(), b"2");
    assert_eq!(segment.size(), 20);
}

#[test]
fn test_offset_past_end_is_error() {
    let (_temp, dir) = setup_temp_dir();
    let path = {
        let mut segment = Segment::create("t_1", &dir, &TableOptions::default()).unwrap();
        segment.write("a", b"1").unwrap();
        segment.path().to_path_buf()
    };

    let mut index = SegmentIndex::new();
    index.update("a", 400);
    let segment = Segment::from_recovered("t_1", path, index, 500, &TableOptions::default());

    assert!(matches!(segment.read("a"), Err(SegkvError::Corruption(_))));
}

#[test]
fn test_truncated_record_on_read_is_corruption() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::create("t_1", &dir, &TableOptions::default()).unwrap();
    segment.write("a", b"1").unwrap();

    // Replace the file with a partial record
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(segment.path())
        .unwrap();
    file.write_all(&[0, 0, 0, 1, 0]).unwrap();
    drop(file);

    assert!(matches!(segment.read("a"), Err(SegkvError::Corruption(_))));
}

#[test]
fn test_missing_file_read_is_io_error() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::create("t_1", &dir, &TableOptions::default()).unwrap();
    segment.write("a", b"1").unwrap();

    fs::remove_file(segment.path()).unwrap();

    assert!(matches!(segment.read("a"), Err(SegkvError::Io(_))));
}

// =============================================================================
// Naming Tests
// =============================================================================

#[test]
fn test_segment_names_sort_by_stamp() {
    let early = segment_name("users", 9);
    let late = segment_name("users", 10);

    assert!(early < late);
    assert_eq!(parse_segment_stamp("users", &late), Some(10));
    assert_eq!(parse_segment_stamp("users", "orders_00000000000000000010"), None);
    assert_eq!(parse_segment_stamp("users", "users_notanumber"), None);
}

#[test]
fn test_next_segment_name_is_strictly_increasing() {
    let mut previous = next_segment_name("t", None);

    for _ in 0..100 {
        let next = next_segment_name("t", Some(&previous));
        assert!(next > previous, "{} should sort after {}", next, previous);
        previous = next;
    }
}

#[test]
fn test_next_segment_name_passes_future_stamp() {
    let future = segment_name("t", u64::MAX - 1);

    let next = next_segment_name("t", Some(&future));

    assert_eq!(parse_segment_stamp("t", &next), Some(u64::MAX));
}
