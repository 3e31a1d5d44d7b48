//! Stop signal for the worker loop
//!
//! The orchestrator stops a pod with SIGTERM; Ctrl-C covers local runs.
//! Either one flips the `watch` channel that [`crate::Worker::run`] checks
//! between polls.

use std::future::Future;
use tokio::sync::watch;

/// Spawn a task that sends `true` once `signal` resolves
pub fn shutdown_on<F>(signal: F) -> watch::Receiver<bool>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        signal.await;
        let _ = tx.send(true);
    });
    rx
}

/// Resolves on Ctrl-C or, on unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryQueue, OutputLog, Worker, WorkerSettings};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_receiver_flips_when_signal_resolves() {
        let (fire, fired) = oneshot::channel::<()>();
        let mut rx = shutdown_on(async move {
            let _ = fired.await;
        });

        assert!(!*rx.borrow());
        fire.send(()).unwrap();
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn test_signal_stops_running_worker_with_stats() {
        let dir = tempfile::tempdir().unwrap();
        let worker = Arc::new(Worker::new(
            "worker-1",
            MemoryQueue::with_items(["A"]),
            OutputLog::new(dir.path()),
            WorkerSettings {
                poll_interval: Duration::from_millis(5),
                heartbeat_every: 10,
            },
        ));

        let (fire, fired) = oneshot::channel::<()>();
        let rx = shutdown_on(async move {
            let _ = fired.await;
        });

        let handle = {
            let worker = worker.clone();
            tokio::spawn(async move { worker.run(rx).await })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;
        fire.send(()).unwrap();

        let stats = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(stats.processed, 1);
        assert!(stats.polls >= 2);
    }
}
