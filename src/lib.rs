//! # segkv
//!
//! An embedded, single-node key-value store with:
//! - Named databases holding named tables
//! - Append-only log segments per table, rolled over at a size limit
//! - O(1) positioned reads through in-memory indexes
//! - A bounded LRU cache in front of every table
//! - Full state recovery by replaying segments at startup
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    DatabaseServer                           │
//! │              (single command worker)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                ExecutionEnvironment                         │
//! │            (databases by name, working dir)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!               ┌───────▼───────┐
//!               │   Database    │
//!               └───────┬───────┘
//!                       │
//!               ┌───────▼───────┐       ┌──────────────┐
//!               │ CachingTable  │──────▶│ BoundedCache │
//!               └───────┬───────┘       └──────────────┘
//!                       │
//!               ┌───────▼───────┐       ┌──────────────┐
//!               │ SegmentTable  │──────▶│  TableIndex  │
//!               └───────┬───────┘       └──────────────┘
//!                       │
//!               ┌───────▼───────┐       ┌──────────────┐
//!               │   Segment     │──────▶│ SegmentIndex │
//!               │ (append-only) │       └──────────────┘
//!               └───────────────┘
//! ```
//!
//! On disk: `{working_dir}/{database}/{table}/{segment}`.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod cache;
pub mod table;
pub mod database;
pub mod environment;
pub mod recovery;
pub mod command;
pub mod server;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, SegkvError};
pub use config::Config;
pub use database::Database;
pub use environment::ExecutionEnvironment;
pub use command::{Command, CommandResult};
pub use server::DatabaseServer;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of segkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
