//! segkv Server Binary
//!
//! Recovers the working directory, then executes console commands from stdin.

use std::io::{self, BufRead, Write};

use clap::Parser;
use segkv::config::{DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_SEGMENT_SIZE};
use segkv::{Config, DatabaseServer, ExecutionEnvironment};
use tracing_subscriber::{fmt, EnvFilter};

/// segkv Server
#[derive(Parser, Debug)]
#[command(name = "segkv-server")]
#[command(about = "Embedded key-value store with append-only segments")]
#[command(version)]
struct Args {
    /// Working directory holding all databases
    #[arg(short, long, default_value = "./db_files")]
    working_dir: String,

    /// Segment size (bytes) at which a new segment is started
    #[arg(short = 's', long, default_value_t = DEFAULT_MAX_SEGMENT_SIZE)]
    max_segment_size: u64,

    /// Cached entries per table (0 disables the cache)
    #[arg(short, long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,

    /// fsync after every append
    #[arg(long)]
    sync: bool,
}

fn main() {
    // Initialize tracing/logging (stderr, so stdout carries only replies)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,segkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("segkv Server v{}", segkv::VERSION);
    tracing::info!("Working directory: {}", args.working_dir);

    // Build config from args
    let config = Config::builder()
        .working_dir(&args.working_dir)
        .max_segment_size(args.max_segment_size)
        .cache_capacity(args.cache_capacity)
        .sync_writes(args.sync)
        .build();

    // Recover and start the command worker
    let server = match DatabaseServer::initialize(ExecutionEnvironment::new(config)) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Ready for commands");

    if let Err(e) = serve_console(&server) {
        tracing::error!("Console error: {}", e);
        std::process::exit(1);
    }

    match server.shutdown() {
        Ok(env) => tracing::info!("Server stopped with {} databases", env.database_count()),
        Err(e) => {
            tracing::error!("Shutdown failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// One command per stdin line until EOF
fn serve_console(server: &DatabaseServer) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = match server.execute_line(&line).and_then(|pending| pending.wait()) {
            Ok(result) => result.to_string(),
            Err(e) => format!("ERR {}", e),
        };

        writeln!(stdout, "{}", reply)?;
        stdout.flush()?;
    }

    Ok(())
}
