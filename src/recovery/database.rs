//! DatabaseScan stage

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::TableOptions;
use crate::database::Database;
use crate::error::Result;
use crate::table::{CachingTable, SegmentTable, Table};

use super::table::{recover_table, TableContext};
use super::{list_entries, require_dir, EntryKind, RecoveryStats};

/// Replay state of one database directory
pub struct DatabaseContext {
    name: String,
    path: PathBuf,
    tables: HashMap<String, Box<dyn Table>>,
    stats: RecoveryStats,
    options: TableOptions,
}

impl DatabaseContext {
    pub fn new(name: impl Into<String>, path: PathBuf, options: TableOptions) -> Self {
        Self {
            name: name.into(),
            path,
            tables: HashMap::new(),
            stats: RecoveryStats::default(),
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stats(&self) -> RecoveryStats {
        self.stats
    }

    /// Register a recovered table behind its cache
    pub fn with_table(mut self, table: SegmentTable, stats: RecoveryStats) -> Self {
        self.stats.absorb(stats);
        let name = table.name().to_string();
        let table = CachingTable::new(table, self.options.cache_capacity);
        self.tables.insert(name, Box::new(table));
        self
    }

    pub fn into_database(self) -> Database {
        Database::from_recovered(self.name, self.path, self.tables, self.options)
    }
}

/// Recover every table directory of the database
pub fn recover_database(context: DatabaseContext) -> Result<(Database, RecoveryStats)> {
    let path = context.path.clone();
    require_dir(&path)?;

    let mut context = context;
    for table_name in list_entries(&path, EntryKind::Directory)? {
        let table_path = path.join(&table_name);
        let (table, stats) =
            recover_table(TableContext::new(table_name, table_path, context.options))?;
        context = context.with_table(table, stats);
    }

    let stats = context.stats;
    tracing::info!(
        "Recovered database {}: {} tables, {} segments, {} records",
        context.name,
        stats.tables,
        stats.segments,
        stats.records
    );

    Ok((context.into_database(), stats))
}
