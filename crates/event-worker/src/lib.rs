//! Event Worker
//!
//! Drains a shared work queue one item at a time and records each
//! processed item in an append-only output log. Several workers may drain
//! the same queue; the store's atomic pop hands every item to exactly one
//! of them.

pub mod config;
pub mod error;
pub mod output;
pub mod queue;
pub mod shutdown;
pub mod worker;

pub use config::WorkerConfig;
pub use error::{Result, WorkerError};
pub use output::OutputLog;
pub use queue::{MemoryQueue, RedisQueue, WorkQueue};
pub use worker::{PollOutcome, Worker, WorkerSettings, WorkerStats};
