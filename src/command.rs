//! Command definitions
//!
//! Typed operations against an [`ExecutionEnvironment`] and their results.
//!
//! ## Console Format
//! One command per line, arguments separated by whitespace:
//! ```text
//! CREATE_DATABASE <db>
//! CREATE_TABLE    <db> <table>
//! SET_KEY         <db> <table> <key> <value...>
//! GET_KEY         <db> <table> <key>
//! DELETE_KEY      <db> <table> <key>
//! ```
//! Command names are case-insensitive. The value of `SET_KEY` is the rest of
//! the line, so it may contain spaces.

use std::fmt;

use bytes::Bytes;

use crate::database::Database;
use crate::environment::ExecutionEnvironment;
use crate::error::{Result, SegkvError};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    CreateDatabase,
    CreateTable,
    SetKey,
    GetKey,
    DeleteKey,
}

impl CommandType {
    pub fn name(self) -> &'static str {
        match self {
            CommandType::CreateDatabase => "CREATE_DATABASE",
            CommandType::CreateTable => "CREATE_TABLE",
            CommandType::SetKey => "SET_KEY",
            CommandType::GetKey => "GET_KEY",
            CommandType::DeleteKey => "DELETE_KEY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        const ALL: [CommandType; 5] = [
            CommandType::CreateDatabase,
            CommandType::CreateTable,
            CommandType::SetKey,
            CommandType::GetKey,
            CommandType::DeleteKey,
        ];
        ALL.into_iter().find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Number of arguments after the command name
    pub fn arity(self) -> usize {
        match self {
            CommandType::CreateDatabase => 1,
            CommandType::CreateTable => 2,
            CommandType::SetKey => 4,
            CommandType::GetKey | CommandType::DeleteKey => 3,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateDatabase {
        database: String,
    },
    CreateTable {
        database: String,
        table: String,
    },
    SetKey {
        database: String,
        table: String,
        key: String,
        value: Bytes,
    },
    GetKey {
        database: String,
        table: String,
        key: String,
    },
    DeleteKey {
        database: String,
        table: String,
        key: String,
    },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::CreateDatabase { .. } => CommandType::CreateDatabase,
            Command::CreateTable { .. } => CommandType::CreateTable,
            Command::SetKey { .. } => CommandType::SetKey,
            Command::GetKey { .. } => CommandType::GetKey,
            Command::DeleteKey { .. } => CommandType::DeleteKey,
        }
    }

    /// Parse one console line
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let kind = CommandType::from_name(name)
            .ok_or_else(|| SegkvError::InvalidArgument(format!("unknown command {:?}", name)))?;

        let mut args: Vec<&str> = Vec::new();
        let mut remaining = rest.trim_start();

        if kind == CommandType::SetKey {
            while args.len() + 1 < kind.arity() && !remaining.is_empty() {
                let (token, tail) = remaining
                    .split_once(char::is_whitespace)
                    .unwrap_or((remaining, ""));
                args.push(token);
                remaining = tail.trim_start();
            }
            if !remaining.is_empty() {
                args.push(remaining);
            }
        } else {
            args.extend(remaining.split_whitespace());
        }

        Self::from_parts(kind, &args)
    }

    /// Build a command from its name and arguments
    pub fn from_args(args: &[&str]) -> Result<Self> {
        let (name, rest) = args
            .split_first()
            .ok_or_else(|| SegkvError::InvalidArgument("empty command".to_string()))?;
        let kind = CommandType::from_name(name)
            .ok_or_else(|| SegkvError::InvalidArgument(format!("unknown command {:?}", name)))?;
        Self::from_parts(kind, rest)
    }

    fn from_parts(kind: CommandType, args: &[&str]) -> Result<Self> {
        if args.len() != kind.arity() {
            return Err(SegkvError::InvalidArgument(format!(
                "{} expects {} arguments, got {}",
                kind.name(),
                kind.arity(),
                args.len()
            )));
        }

        let arg = |i: usize| args[i].to_string();
        let command = match kind {
            CommandType::CreateDatabase => Command::CreateDatabase { database: arg(0) },
            CommandType::CreateTable => Command::CreateTable {
                database: arg(0),
                table: arg(1),
            },
            CommandType::SetKey => Command::SetKey {
                database: arg(0),
                table: arg(1),
                key: arg(2),
                value: Bytes::copy_from_slice(args[3].as_bytes()),
            },
            CommandType::GetKey => Command::GetKey {
                database: arg(0),
                table: arg(1),
                key: arg(2),
            },
            CommandType::DeleteKey => Command::DeleteKey {
                database: arg(0),
                table: arg(1),
                key: arg(2),
            },
        };
        Ok(command)
    }

    /// Run the command, turning any engine error into an error result
    pub fn execute(self, env: &mut ExecutionEnvironment) -> CommandResult {
        match self.run(env) {
            Ok(payload) => CommandResult::Success(payload),
            Err(e) => CommandResult::Error(e.to_string()),
        }
    }

    fn run(self, env: &mut ExecutionEnvironment) -> Result<Option<Bytes>> {
        match self {
            Command::CreateDatabase { database } => {
                env.create_database(&database)?;
                Ok(Some(Bytes::from(format!("Database {} created", database))))
            }
            Command::CreateTable { database, table } => {
                database_mut(env, &database)?.create_table_if_not_exists(&table)?;
                Ok(Some(Bytes::from(format!(
                    "Table {} in database {} created",
                    table, database
                ))))
            }
            Command::SetKey {
                database,
                table,
                key,
                value,
            } => {
                let db = database_mut(env, &database)?;
                // The previous value is informational; an unreadable old
                // record must not block the new write.
                let previous = match db.read(&table, &key) {
                    Ok(previous) => previous,
                    Err(e) => {
                        tracing::warn!("SET_KEY {}: previous value unreadable: {}", key, e);
                        None
                    }
                };
                db.write(&table, &key, &value)?;
                Ok(previous)
            }
            Command::GetKey {
                database,
                table,
                key,
            } => database_mut(env, &database)?.read(&table, &key),
            Command::DeleteKey {
                database,
                table,
                key,
            } => database_mut(env, &database)?.delete(&table, &key).map(Some),
        }
    }
}

fn database_mut<'a>(env: &'a mut ExecutionEnvironment, name: &str) -> Result<&'a mut Database> {
    env.database_mut(name)
        .ok_or_else(|| SegkvError::DatabaseNotFound(name.to_string()))
}

/// Outcome of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Payload is absent for reads of missing keys and first writes
    Success(Option<Bytes>),
    Error(String),
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Success(_))
    }

    pub fn payload(&self) -> Option<&Bytes> {
        match self {
            CommandResult::Success(payload) => payload.as_ref(),
            CommandResult::Error(_) => None,
        }
    }

    /// Payload decoded as UTF-8 (lossy)
    pub fn payload_string(&self) -> Option<String> {
        self.payload()
            .map(|p| String::from_utf8_lossy(p).into_owned())
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            CommandResult::Success(_) => None,
            CommandResult::Error(message) => Some(message),
        }
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Success(None) => write!(f, "OK (nil)"),
            CommandResult::Success(Some(payload)) => {
                write!(f, "OK {}", String::from_utf8_lossy(payload))
            }
            CommandResult::Error(message) => write!(f, "ERR {}", message),
        }
    }
}
