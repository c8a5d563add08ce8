//! Execution Environment
//!
//! Registry of every database of one server plus the working directory.
//!
//! ## Lifecycle
//! 1. `ExecutionEnvironment::new(config)`: empty registry
//! 2. `recovery::initialize(env)`: populated from disk
//! 3. operations: `create_database`, `database_mut`, ...
//!
//! [`ExecutionEnvironment::open`] runs steps 1 and 2.

use std::collections::HashMap;
use std::path::Path;

use crate::config::Config;
use crate::database::Database;
use crate::error::{Result, SegkvError};
use crate::recovery;

/// All databases of one server instance
pub struct ExecutionEnvironment {
    config: Config,
    databases: HashMap<String, Database>,
}

impl ExecutionEnvironment {
    /// An empty environment; nothing is read from disk
    pub fn new(config: Config) -> Self {
        Self {
            config,
            databases: HashMap::new(),
        }
    }

    /// Create an environment and recover every database under the working dir
    pub fn open(config: Config) -> Result<Self> {
        recovery::initialize(Self::new(config))
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified working directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().working_dir(path).build())
    }

    pub fn working_dir(&self) -> &Path {
        &self.config.working_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a database directory and register it
    ///
    /// Fails with `AlreadyExists` if a database of that name is registered.
    pub fn create_database(&mut self, name: &str) -> Result<()> {
        if self.databases.contains_key(name) {
            return Err(SegkvError::AlreadyExists(format!("database {}", name)));
        }

        let database = Database::create(name, &self.config.working_dir, self.config.table_options())?;
        self.add_database(database);
        Ok(())
    }

    /// Register a database, replacing any with the same name
    pub fn add_database(&mut self, database: Database) {
        self.databases.insert(database.name().to_string(), database);
    }

    pub fn database(&self, name: &str) -> Option<&Database> {
        self.databases.get(name)
    }

    pub fn database_mut(&mut self, name: &str) -> Option<&mut Database> {
        self.databases.get_mut(name)
    }

    pub fn database_names(&self) -> impl Iterator<Item = &str> {
        self.databases.keys().map(String::as_str)
    }

    pub fn database_count(&self) -> usize {
        self.databases.len()
    }
}
