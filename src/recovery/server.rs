//! ServerScan stage

use std::fs;

use crate::environment::ExecutionEnvironment;
use crate::error::{Result, SegkvError};

use super::database::{recover_database, DatabaseContext};
use super::{list_entries, EntryKind, RecoveryStats};

/// Create the working directory if needed and recover every database in it
pub fn recover_server(env: ExecutionEnvironment) -> Result<ExecutionEnvironment> {
    let working_dir = env.working_dir().to_path_buf();
    let options = env.config().table_options();

    fs::create_dir_all(&working_dir).map_err(|e| SegkvError::recovery(&working_dir, e.into()))?;

    let mut env = env;
    let mut totals = RecoveryStats::default();
    for database_name in list_entries(&working_dir, EntryKind::Directory)? {
        let database_path = working_dir.join(&database_name);
        let (database, stats) =
            recover_database(DatabaseContext::new(database_name, database_path, options))?;
        totals.absorb(stats);
        env.add_database(database);
    }

    tracing::info!(
        "Recovered {} databases, {} tables, {} segments, {} records from {}",
        env.database_count(),
        totals.tables,
        totals.segments,
        totals.records,
        working_dir.display()
    );

    Ok(env)
}
