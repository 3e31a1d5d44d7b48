//! Queue worker loop
//!
//! Pops one item per iteration. A processed item is followed immediately
//! by the next pop; an empty queue sleeps for the poll interval. Every
//! `heartbeat_every`-th poll that finds nothing logs a heartbeat.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::WorkerConfig;
use crate::error::Result;
use crate::output::OutputLog;
use crate::queue::WorkQueue;

/// Loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    pub poll_interval: Duration,
    pub heartbeat_every: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            heartbeat_every: 10,
        }
    }
}

impl From<&WorkerConfig> for WorkerSettings {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            heartbeat_every: config.heartbeat_every.max(1),
        }
    }
}

/// What a single poll did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Processed(String),
    Idle { checks: u64, heartbeat: bool },
}

/// Counters for a worker's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub polls: u64,
    pub processed: u64,
    pub heartbeats: u64,
}

pub struct Worker<Q> {
    name: String,
    queue: Q,
    output: OutputLog,
    settings: WorkerSettings,
    polls: AtomicU64,
    processed: AtomicU64,
    heartbeats: AtomicU64,
}

impl<Q: WorkQueue> Worker<Q> {
    pub fn new(
        name: impl Into<String>,
        queue: Q,
        output: OutputLog,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            name: name.into(),
            queue,
            output,
            settings: WorkerSettings {
                heartbeat_every: settings.heartbeat_every.max(1),
                ..settings
            },
            polls: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            heartbeats: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn stats(&self) -> WorkerStats {
        WorkerStats {
            polls: self.polls.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            heartbeats: self.heartbeats.load(Ordering::Relaxed),
        }
    }

    /// Pop at most one item and record it.
    ///
    /// Queue and output errors are returned as-is; the popped item is not
    /// pushed back.
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        let checks = self.polls.fetch_add(1, Ordering::Relaxed) + 1;

        // An empty string popped from the list counts as no work
        match self.queue.pop().await?.filter(|item| !item.is_empty()) {
            Some(item) => {
                info!(worker = %self.name, item = %item, "Processing: {}", item);
                self.output.append(&self.name, &item).await?;
                self.processed.fetch_add(1, Ordering::Relaxed);
                info!(worker = %self.name, item = %item, "Completed: {}", item);
                Ok(PollOutcome::Processed(item))
            }
            None => {
                let heartbeat = checks % self.settings.heartbeat_every == 0;
                if heartbeat {
                    self.heartbeats.fetch_add(1, Ordering::Relaxed);
                    info!(
                        worker = %self.name,
                        checks,
                        "Waiting for work... (checked {} times)",
                        checks
                    );
                }
                Ok(PollOutcome::Idle { checks, heartbeat })
            }
        }
    }

    /// Drain the queue until `shutdown` turns true or an error occurs
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<WorkerStats> {
        info!(
            worker = %self.name,
            backend = self.queue.backend(),
            poll_interval_ms = self.settings.poll_interval.as_millis() as u64,
            "Worker loop started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            if let PollOutcome::Idle { .. } = self.poll_once().await? {
                tokio::select! {
                    _ = tokio::time::sleep(self.settings.poll_interval) => {}
                    changed = shutdown.changed() => {
                        // Sender dropped: nobody can stop us any more, keep polling
                        if changed.is_err() {
                            debug!(worker = %self.name, "Shutdown sender dropped");
                            tokio::time::sleep(self.settings.poll_interval).await;
                        }
                    }
                }
            }
        }

        let stats = self.stats();
        info!(
            worker = %self.name,
            polls = stats.polls,
            processed = stats.processed,
            "Worker loop stopped"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkerError;
    use crate::queue::MemoryQueue;
    use futures::future::{self, BoxFuture, FutureExt};

    struct BrokenQueue;

    impl WorkQueue for BrokenQueue {
        fn backend(&self) -> &'static str {
            "broken"
        }

        fn pop(&self) -> BoxFuture<'_, Result<Option<String>>> {
            future::ready(Err(WorkerError::Queue("connection reset".to_string()))).boxed()
        }

        fn push<'a>(&'a self, _item: &'a str) -> BoxFuture<'a, Result<usize>> {
            future::ready(Ok(0)).boxed()
        }

        fn len(&self) -> BoxFuture<'_, Result<usize>> {
            future::ready(Ok(0)).boxed()
        }

        fn ping(&self) -> BoxFuture<'_, Result<()>> {
            future::ready(Ok(())).boxed()
        }
    }

    fn settings(heartbeat_every: u64) -> WorkerSettings {
        WorkerSettings {
            poll_interval: Duration::from_millis(5),
            heartbeat_every,
        }
    }

    #[tokio::test]
    async fn test_poll_once_processes_head() {
        let dir = tempfile::tempdir().unwrap();
        let worker = Worker::new(
            "worker-1",
            MemoryQueue::with_items(["A", "B"]),
            OutputLog::new(dir.path()),
            settings(10),
        );

        assert_eq!(
            worker.poll_once().await.unwrap(),
            PollOutcome::Processed("A".to_string())
        );
        assert_eq!(worker.queue().len().await.unwrap(), 1);
        assert_eq!(worker.stats().processed, 1);
    }

    #[tokio::test]
    async fn test_idle_heartbeat_only_at_multiples() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputLog::new(dir.path());
        let worker = Worker::new("worker-1", MemoryQueue::new(), output.clone(), settings(10));

        let mut heartbeat_checks = Vec::new();
        for _ in 0..25 {
            match worker.poll_once().await.unwrap() {
                PollOutcome::Idle { checks, heartbeat } => {
                    if heartbeat {
                        heartbeat_checks.push(checks);
                    }
                }
                PollOutcome::Processed(item) => panic!("unexpected item {}", item),
            }
        }

        assert_eq!(heartbeat_checks, vec![10, 20]);
        assert_eq!(worker.stats().heartbeats, 2);
        assert!(!output.path().exists());
    }

    #[tokio::test]
    async fn test_zero_heartbeat_interval_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let worker = Worker::new(
            "worker-1",
            MemoryQueue::new(),
            OutputLog::new(dir.path()),
            settings(0),
        );

        assert_eq!(
            worker.poll_once().await.unwrap(),
            PollOutcome::Idle {
                checks: 1,
                heartbeat: true
            }
        );
    }

    #[tokio::test]
    async fn test_queue_error_stops_run() {
        let dir = tempfile::tempdir().unwrap();
        let worker = Worker::new("worker-1", BrokenQueue, OutputLog::new(dir.path()), settings(10));
        let (_tx, rx) = watch::channel(false);

        let err = worker.run(rx).await.unwrap_err();
        assert!(matches!(err, WorkerError::Queue(_)));
    }

    #[tokio::test]
    async fn test_output_error_stops_run_and_item_is_not_requeued() {
        let dir = tempfile::tempdir().unwrap();
        let worker = Worker::new(
            "worker-1",
            MemoryQueue::with_items(["A"]),
            OutputLog::new(dir.path().join("missing")),
            settings(10),
        );
        let (_tx, rx) = watch::channel(false);

        let err = worker.run(rx).await.unwrap_err();
        assert!(matches!(err, WorkerError::Output(_)));
        assert_eq!(worker.queue().len().await.unwrap(), 0);
        assert_eq!(worker.stats().processed, 0);
    }

    #[tokio::test]
    async fn test_empty_item_counts_as_idle() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputLog::new(dir.path());
        let worker = Worker::new(
            "worker-1",
            MemoryQueue::with_items(["", "B"]),
            output.clone(),
            settings(10),
        );

        assert_eq!(
            worker.poll_once().await.unwrap(),
            PollOutcome::Idle {
                checks: 1,
                heartbeat: false
            }
        );
        assert_eq!(
            worker.poll_once().await.unwrap(),
            PollOutcome::Processed("B".to_string())
        );

        let content = std::fs::read_to_string(output.path()).unwrap();
        assert_eq!(content, "[worker-1] Processed: B\n");
    }

    #[tokio::test]
    async fn test_run_returns_immediately_when_already_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let worker = Worker::new(
            "worker-1",
            MemoryQueue::with_items(["A"]),
            OutputLog::new(dir.path()),
            settings(10),
        );
        let (_tx, rx) = watch::channel(true);

        let stats = worker.run(rx).await.unwrap();
        assert_eq!(stats, WorkerStats::default());
        assert_eq!(worker.queue().len().await.unwrap(), 1);
    }
}
