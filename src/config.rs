//! Configuration for segkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, SegkvError};

/// Default maximum segment size, in encoded record bytes
pub const DEFAULT_MAX_SEGMENT_SIZE: u64 = 100_000;

/// Default number of entries held by each table cache
pub const DEFAULT_CACHE_CAPACITY: usize = 5_000;

/// Main configuration for a segkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all databases
    /// Internal structure:
    ///   {working_dir}/
    ///     └── {database}/
    ///         └── {table}/
    ///             └── {table}_{stamp}   (segment files)
    pub working_dir: PathBuf,

    /// Size at which the active segment becomes read-only
    pub max_segment_size: u64,

    /// fsync segment data after every append
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Cache Configuration
    // -------------------------------------------------------------------------
    /// Entries kept in memory per table
    pub cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("./db_files"),
            max_segment_size: DEFAULT_MAX_SEGMENT_SIZE,
            sync_writes: false,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_segment_size == 0 {
            return Err(SegkvError::InvalidArgument(
                "max_segment_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-table settings derived from this config
    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            max_segment_size: self.max_segment_size,
            cache_capacity: self.cache_capacity,
            sync_writes: self.sync_writes,
        }
    }
}

/// The subset of [`Config`] every table is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    pub max_segment_size: u64,
    pub cache_capacity: usize,
    pub sync_writes: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Config::default().table_options()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the working directory (root for all databases)
    pub fn working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.working_dir = path.into();
        self
    }

    /// Set the maximum segment size
    pub fn max_segment_size(mut self, size: u64) -> Self {
        self.config.max_segment_size = size;
        self
    }

    /// Set the per-table cache capacity (0 disables caching)
    pub fn cache_capacity(mut self, entries: usize) -> Self {
        self.config.cache_capacity = entries;
        self
    }

    /// fsync after every segment append
    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.config.sync_writes = sync;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
