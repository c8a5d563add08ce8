//! Database
//!
//! A named directory of tables. Routes every key operation by table name.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::config::TableOptions;
use crate::error::{Result, SegkvError};
use crate::table::{CachingTable, SegmentTable, Table};

/// A set of tables stored under `{working_dir}/{name}`
pub struct Database {
    name: String,
    path: PathBuf,
    tables: HashMap<String, Box<dyn Table>>,
    options: TableOptions,
}

impl Database {
    /// Create the database directory under `working_dir`
    pub fn create(name: &str, working_dir: &Path, options: TableOptions) -> Result<Self> {
        validate_name("database", name)?;

        let path = working_dir.join(name);
        fs::create_dir_all(&path)?;

        tracing::info!("Created database {} at {}", name, path.display());

        Ok(Self {
            name: name.to_string(),
            path,
            tables: HashMap::new(),
            options,
        })
    }

    /// Build a database from recovered tables
    pub fn from_recovered(
        name: impl Into<String>,
        path: PathBuf,
        tables: HashMap<String, Box<dyn Table>>,
        options: TableOptions,
    ) -> Self {
        Self {
            name: name.into(),
            path,
            tables,
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create and register a new cache-wrapped table
    ///
    /// Fails with `AlreadyExists` if a table of that name is registered.
    pub fn create_table_if_not_exists(&mut self, table_name: &str) -> Result<()> {
        validate_name("table", table_name)?;

        if self.tables.contains_key(table_name) {
            return Err(SegkvError::AlreadyExists(format!(
                "table {} in database {}",
                table_name, self.name
            )));
        }

        let table = SegmentTable::create(table_name, &self.path, self.options)?;
        let table = CachingTable::new(table, self.options.cache_capacity);
        self.tables.insert(table_name.to_string(), Box::new(table));

        tracing::info!("Created table {} in database {}", table_name, self.name);
        Ok(())
    }

    pub fn write(&mut self, table_name: &str, key: &str, value: &[u8]) -> Result<()> {
        self.table_mut(table_name)?.write(key, value)
    }

    /// Read `key` from `table_name`; a missing table reads as not found
    pub fn read(&mut self, table_name: &str, key: &str) -> Result<Option<Bytes>> {
        match self.tables.get_mut(table_name) {
            Some(table) => table.read(key),
            None => Ok(None),
        }
    }

    pub fn delete(&mut self, table_name: &str, key: &str) -> Result<Bytes> {
        self.table_mut(table_name)?.delete(key)
    }

    pub fn has_table(&self, table_name: &str) -> bool {
        self.tables.contains_key(table_name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    fn table_mut(&mut self, table_name: &str) -> Result<&mut Box<dyn Table>> {
        self.tables
            .get_mut(table_name)
            .ok_or_else(|| SegkvError::TableNotFound(format!("{} in database {}", table_name, self.name)))
    }
}

/// Database and table names become directory names: one plain path component
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(&['/', '\\', '\0'][..]);

    if invalid {
        return Err(SegkvError::InvalidArgument(format!(
            "invalid {} name {:?}",
            kind, name
        )));
    }
    Ok(())
}
