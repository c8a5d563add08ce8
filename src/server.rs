//! Database Server
//!
//! Executes commands one at a time on a single worker thread.
//!
//! ## Concurrency Model: Single Worker
//!
//! - The worker thread owns the [`ExecutionEnvironment`]; nothing else can
//!   touch it while the server runs
//! - Callers enqueue commands from any thread and get a [`PendingResult`]
//! - Commands run in queue order, so two mutations of one table never
//!   interleave and the engine itself needs no locks

use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};

use crate::command::{Command, CommandResult};
use crate::environment::ExecutionEnvironment;
use crate::error::{Result, SegkvError};
use crate::recovery;

struct Job {
    command: Command,
    reply: Sender<CommandResult>,
}

/// Front-end of the command worker
pub struct DatabaseServer {
    /// Closed (dropped) on shutdown, which ends the worker loop
    queue: Option<Sender<Job>>,
    /// Hands the environment back when it exits
    worker: Option<JoinHandle<ExecutionEnvironment>>,
}

impl DatabaseServer {
    /// Recover `env` from disk, then start the worker
    pub fn initialize(env: ExecutionEnvironment) -> Result<Self> {
        let env = recovery::initialize(env)?;
        Self::start(env)
    }

    /// Start the worker on an environment that is already initialized
    pub fn start(env: ExecutionEnvironment) -> Result<Self> {
        let (queue, jobs) = channel::unbounded();

        let worker = thread::Builder::new()
            .name("segkv-worker".to_string())
            .spawn(move || run_worker(env, jobs))?;

        Ok(Self {
            queue: Some(queue),
            worker: Some(worker),
        })
    }

    /// Enqueue a command; the result arrives through the returned handle
    pub fn execute(&self, command: Command) -> Result<PendingResult> {
        let queue = self.queue.as_ref().ok_or(SegkvError::ServerShutdown)?;
        let (reply, receiver) = channel::bounded(1);

        queue
            .send(Job { command, reply })
            .map_err(|_| SegkvError::ServerShutdown)?;

        Ok(PendingResult { receiver })
    }

    /// Parse a console line and enqueue it
    pub fn execute_line(&self, line: &str) -> Result<PendingResult> {
        self.execute(Command::parse(line)?)
    }

    /// Drain the queue, stop the worker and take the environment back
    pub fn shutdown(mut self) -> Result<ExecutionEnvironment> {
        self.queue.take();
        let worker = self.worker.take().ok_or(SegkvError::ServerShutdown)?;
        worker.join().map_err(|_| SegkvError::ServerShutdown)
    }
}

impl Drop for DatabaseServer {
    fn drop(&mut self) {
        self.queue.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Command worker panicked");
            }
        }
    }
}

fn run_worker(mut env: ExecutionEnvironment, jobs: Receiver<Job>) -> ExecutionEnvironment {
    tracing::debug!("Command worker started");

    for job in jobs.iter() {
        let kind = job.command.command_type();
        tracing::trace!("Executing {}", kind.name());

        let result = job.command.execute(&mut env);
        if let CommandResult::Error(message) = &result {
            tracing::warn!("{} failed: {}", kind.name(), message);
        }

        // The caller may have dropped its handle; the command still ran.
        let _ = job.reply.send(result);
    }

    tracing::debug!("Command worker stopped");
    env
}

/// Completion handle for an enqueued command
pub struct PendingResult {
    receiver: Receiver<CommandResult>,
}

impl PendingResult {
    /// Block until the command has run
    pub fn wait(self) -> Result<CommandResult> {
        self.receiver.recv().map_err(|_| SegkvError::ServerShutdown)
    }

    /// The result if the command already ran
    pub fn try_result(&self) -> Option<CommandResult> {
        self.receiver.try_recv().ok()
    }
}
