//! Worker configuration from flags or environment

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, WorkerError};

#[derive(Debug, Clone, Args)]
pub struct WorkerConfig {
    /// Redis host
    #[arg(long, default_value = "redis", env = "REDIS_HOST")]
    pub redis_host: String,

    /// Redis port
    #[arg(long, default_value = "6379", env = "REDIS_PORT")]
    pub redis_port: u16,

    /// Redis list used as the work queue
    #[arg(long, default_value = "work_queue", env = "QUEUE_NAME")]
    pub queue_name: String,

    /// Directory holding output.txt
    #[arg(long, default_value = "/data", env = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Name written into every log line
    #[arg(long, default_value = "worker-1", env = "WORKER_NAME")]
    pub worker_name: String,

    /// Sleep between polls of an empty queue, in milliseconds
    #[arg(long, default_value = "1000", env = "POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,

    /// Emit a heartbeat every N polls while idle
    #[arg(long, default_value = "10", env = "HEARTBEAT_EVERY")]
    pub heartbeat_every: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            redis_host: "redis".to_string(),
            redis_port: 6379,
            queue_name: "work_queue".to_string(),
            output_dir: PathBuf::from("/data"),
            worker_name: "worker-1".to_string(),
            poll_interval_ms: 1000,
            heartbeat_every: 10,
        }
    }
}

impl WorkerConfig {
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.heartbeat_every == 0 {
            return Err(WorkerError::InvalidConfig(
                "heartbeat_every must be at least 1".to_string(),
            ));
        }
        if self.queue_name.is_empty() {
            return Err(WorkerError::InvalidConfig(
                "queue_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
