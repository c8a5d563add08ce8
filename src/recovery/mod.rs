//! Recovery Module
//!
//! Rebuilds every in-memory structure from the directory tree at startup.
//!
//! ## Stages
//! ```text
//!   ServerScan      {working_dir}/            each dir  → DatabaseScan
//!   DatabaseScan    {working_dir}/{db}/       each dir  → TableScan
//!   TableScan       {working_dir}/{db}/{t}/   each file → SegmentReplay (sorted by name)
//!   SegmentReplay   {working_dir}/{db}/{t}/{segment}
//! ```
//!
//! Each stage takes an owned context, and returns either the finished value
//! with its [`RecoveryStats`] or the error that aborts startup. A parent folds every child result into
//! its own context before building its output, so no context is shared or
//! mutated across stages. There is no partial recovery: the first missing
//! directory, unreadable file or malformed record fails the whole pipeline.

mod database;
mod segment;
mod server;
mod table;

use std::fs;
use std::io;
use std::path::Path;

use crate::environment::ExecutionEnvironment;
use crate::error::{Result, SegkvError};

pub use database::{recover_database, DatabaseContext};
pub use segment::{replay_segment, SegmentContext};
pub use server::recover_server;
pub use table::{recover_table, TableContext};

/// Populate `env` from its working directory
///
/// Either every database, table and segment is recovered, or a
/// `Recovery` error names the path that failed.
pub fn initialize(env: ExecutionEnvironment) -> Result<ExecutionEnvironment> {
    env.config().validate()?;
    recover_server(env)
}

/// What a stage replayed, summed up the pipeline for the startup log
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryStats {
    pub tables: usize,
    pub segments: usize,
    pub records: u64,
}

impl RecoveryStats {
    fn absorb(&mut self, other: RecoveryStats) {
        self.tables += other.tables;
        self.segments += other.segments;
        self.records += other.records;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    File,
}

/// Names of the entries of `dir` of the given kind, sorted ascending
fn list_entries(dir: &Path, kind: EntryKind) -> Result<Vec<String>> {
    let fail = |e: SegkvError| SegkvError::recovery(dir, e);

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| fail(e.into()))? {
        let entry = entry.map_err(|e| fail(e.into()))?;
        let file_type = entry.file_type().map_err(|e| fail(e.into()))?;

        let wanted = match kind {
            EntryKind::Directory => file_type.is_dir(),
            EntryKind::File => file_type.is_file(),
        };
        if !wanted {
            continue;
        }

        let name = entry.file_name().into_string().map_err(|raw| {
            SegkvError::recovery(
                entry.path(),
                SegkvError::InvalidArgument(format!("non UTF-8 name {:?}", raw)),
            )
        })?;
        names.push(name);
    }

    names.sort();
    Ok(names)
}

/// Fail unless `dir` is an existing directory
fn require_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    Err(SegkvError::recovery(
        dir,
        io::Error::new(io::ErrorKind::NotFound, "directory does not exist").into(),
    ))
}
