//! Tests for SegmentTable
//!
//! These tests verify:
//! - Basic write/read/delete
//! - Delete returns the prior value, and fails for absent or deleted keys
//! - Rollover to a new active segment when the current one fills up
//! - Reads of keys living in read-only segments
//! - Tombstones always land in the active segment

use std::fs;
use std::path::PathBuf;

use segkv::config::TableOptions;
use segkv::table::{SegmentTable, Table};
use segkv::SegkvError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_table(max_segment_size: u64) -> (TempDir, SegmentTable) {
    let temp_dir = TempDir::new().unwrap();
    let options = TableOptions {
        max_segment_size,
        ..TableOptions::default()
    };
    let table = SegmentTable::create("t", temp_dir.path(), options).unwrap();
    (temp_dir, table)
}

fn segment_files(table: &SegmentTable) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(table.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    files
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_create_makes_directory_without_segments() {
    let (temp, table) = setup_temp_table(1000);

    assert!(temp.path().join("t").is_dir());
    assert_eq!(table.name(), "t");
    assert!(table.active_segment().is_none());
    assert!(segment_files(&table).is_empty());
}

#[test]
fn test_write_then_read() {
    let (_temp, mut table) = setup_temp_table(1000);

    table.write("hello", b"world").unwrap();

    assert_eq!(table.read("hello").unwrap().unwrap().as_ref(), b"world");
    assert_eq!(table.segments().len(), 1);
}

#[test]
fn test_read_never_written_key() {
    let (_temp, mut table) = setup_temp_table(1000);

    assert!(table.read("ghost").unwrap().is_none());
}

#[test]
fn test_overwrite() {
    let (_temp, mut table) = setup_temp_table(1000);

    table.write("k", b"v1").unwrap();
    table.write("k", b"v2").unwrap();

    assert_eq!(table.read("k").unwrap().unwrap().as_ref(), b"v2");
}

#[test]
fn test_delete_returns_previous_value() {
    let (_temp, mut table) = setup_temp_table(1000);
    table.write("a", b"1").unwrap();

    let previous = table.delete("a").unwrap();

    assert_eq!(previous.as_ref(), b"1");
    assert!(table.read("a").unwrap().is_none());
}

#[test]
fn test_delete_absent_key_fails() {
    let (_temp, mut table) = setup_temp_table(1000);

    let result = table.delete("never");

    assert!(matches!(result, Err(SegkvError::KeyNotFound(_))));
    assert!(table.active_segment().is_none());
}

#[test]
fn test_delete_twice_fails() {
    let (_temp, mut table) = setup_temp_table(1000);
    table.write("a", b"1").unwrap();
    table.delete("a").unwrap();
    let size = table.active_segment().unwrap().size();

    assert!(matches!(table.delete("a"), Err(SegkvError::KeyNotFound(_))));
    // No second tombstone written
    assert_eq!(table.active_segment().unwrap().size(), size);
}

#[test]
fn test_write_after_delete() {
    let (_temp, mut table) = setup_temp_table(1000);
    table.write("a", b"1").unwrap();
    table.delete("a").unwrap();

    table.write("a", b"2").unwrap();

    assert_eq!(table.read("a").unwrap().unwrap().as_ref(), b"2");
}

// =============================================================================
// Rollover Tests
// =============================================================================

#[test]
fn test_rollover_creates_new_active_segment() {
    // Each "kN" → "value" record is 8 + 2 + 5 = 15 bytes
    let (_temp, mut table) = setup_temp_table(30);

    table.write("k1", b"value").unwrap();
    table.write("k2", b"value").unwrap();
    assert_eq!(table.segments().len(), 1);
    assert!(table.active_segment().unwrap().is_read_only());

    table.write("k3", b"value").unwrap();

    assert_eq!(table.segments().len(), 2);
    assert_eq!(segment_files(&table).len(), 2);
    assert!(table.segments()[0].is_read_only());
    assert!(!table.active_segment().unwrap().is_read_only());
}

#[test]
fn test_reads_resolve_across_segments() {
    let (_temp, mut table) = setup_temp_table(50);

    for i in 0..20 {
        table
            .write(&format!("key{:02}", i), format!("value{}", i).as_bytes())
            .unwrap();
    }

    assert!(table.segments().len() > 1);
    for i in 0..20 {
        let value = table.read(&format!("key{:02}", i)).unwrap().unwrap();
        assert_eq!(value.as_ref(), format!("value{}", i).as_bytes());
    }
}

#[test]
fn test_segment_names_follow_creation_order() {
    let (_temp, mut table) = setup_temp_table(10);

    for i in 0..5 {
        table.write(&format!("k{}", i), b"v").unwrap(); // one record fills a segment
    }

    let names: Vec<&str> = table.segments().iter().map(|s| s.name()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names.len(), 5);
    assert_eq!(names, sorted);
    assert!(names.iter().all(|name| name.starts_with("t_")));
}

#[test]
fn test_overwrite_in_newer_segment_repoints_index() {
    let (_temp, mut table) = setup_temp_table(20);

    table.write("k", b"old-value").unwrap(); // 8 + 1 + 9 = 18
    table.write("x", b"fill").unwrap(); // segment full
    table.write("k", b"new").unwrap(); // goes to segment 2

    assert_eq!(table.segments().len(), 2);
    assert_eq!(table.segment_name_for("k"), Some(table.segments()[1].name()));
    assert_eq!(table.segment_name_for("x"), Some(table.segments()[0].name()));
    assert_eq!(table.read("k").unwrap().unwrap().as_ref(), b"new");
}

#[test]
fn test_delete_of_key_in_read_only_segment() {
    let (_temp, mut table) = setup_temp_table(20);
    table.write("k", b"old-value").unwrap();
    table.write("x", b"fill").unwrap();
    assert!(table.active_segment().unwrap().is_read_only());
    let frozen_size = table.segments()[0].size();

    let previous = table.delete("k").unwrap();

    assert_eq!(previous.as_ref(), b"old-value");
    // The frozen segment is untouched; the tombstone went to a new segment
    assert_eq!(table.segments().len(), 2);
    assert_eq!(table.segments()[0].size(), frozen_size);
    assert!(table.segments()[1].index().contains("k"));
    assert_eq!(table.segment_name_for("k"), Some(table.segments()[1].name()));
    assert!(table.read("k").unwrap().is_none());
    assert_eq!(table.read("x").unwrap().unwrap().as_ref(), b"fill");
}

#[test]
fn test_sizes_match_files() {
    let (_temp, mut table) = setup_temp_table(64);

    for i in 0..30 {
        table.write(&format!("k{}", i % 7), format!("v{}", i).as_bytes()).unwrap();
        if i % 5 == 0 {
            table.delete(&format!("k{}", i % 7)).unwrap();
        }
    }

    for segment in table.segments() {
        assert_eq!(fs::metadata(segment.path()).unwrap().len(), segment.size());
    }
}
