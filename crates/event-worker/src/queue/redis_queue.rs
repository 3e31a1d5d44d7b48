//! Redis list queue
//!
//! Uses a single `redis::aio::MultiplexedConnection`, opened once at
//! startup with no reconnect. `LPOP` is atomic on the server, which is
//! what gives at-most-once delivery across workers.

use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use super::WorkQueue;
use crate::config::WorkerConfig;
use crate::error::{Result, WorkerError};

#[derive(Clone)]
pub struct RedisQueue {
    connection: redis::aio::MultiplexedConnection,
    key: String,
}

impl std::fmt::Debug for RedisQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisQueue")
            .field("connection", &"MultiplexedConnection")
            .field("key", &self.key)
            .finish()
    }
}

impl RedisQueue {
    /// Connect and run the startup `PING`.
    ///
    /// Any failure here is a [`WorkerError::Connection`]; callers treat it
    /// as fatal.
    pub async fn connect(config: &WorkerConfig) -> Result<Self> {
        let url = config.redis_url();
        let client = redis::Client::open(url.as_str()).map_err(|e| {
            WorkerError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| WorkerError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        let queue = Self {
            connection,
            key: config.queue_name.clone(),
        };

        queue.ping().await.map_err(startup_error)?;

        debug!(url = %url, key = %queue.key, "Redis queue connected");
        Ok(queue)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl WorkQueue for RedisQueue {
    fn backend(&self) -> &'static str {
        "redis"
    }

    fn pop(&self) -> BoxFuture<'_, Result<Option<String>>> {
        async move {
            let mut conn = self.connection.clone();
            let item: Option<String> = redis::cmd("LPOP")
                .arg(&self.key)
                .query_async(&mut conn)
                .await
                .map_err(|e| WorkerError::Queue(format!("Redis LPOP failed: {}", e)))?;
            Ok(item)
        }
        .boxed()
    }

    fn push<'a>(&'a self, item: &'a str) -> BoxFuture<'a, Result<usize>> {
        async move {
            let mut conn = self.connection.clone();
            let len: usize = redis::cmd("RPUSH")
                .arg(&self.key)
                .arg(item)
                .query_async(&mut conn)
                .await
                .map_err(|e| WorkerError::Queue(format!("Redis RPUSH failed: {}", e)))?;
            Ok(len)
        }
        .boxed()
    }

    fn len(&self) -> BoxFuture<'_, Result<usize>> {
        async move {
            let mut conn = self.connection.clone();
            let len: usize = redis::cmd("LLEN")
                .arg(&self.key)
                .query_async(&mut conn)
                .await
                .map_err(|e| WorkerError::Queue(format!("Redis LLEN failed: {}", e)))?;
            Ok(len)
        }
        .boxed()
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        async move {
            let mut conn = self.connection.clone();
            let pong: String = redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(|e| WorkerError::Queue(format!("Redis PING failed: {}", e)))?;

            if pong == "PONG" {
                Ok(())
            } else {
                Err(WorkerError::Queue(format!("Unexpected PING reply: {}", pong)))
            }
        }
        .boxed()
    }
}

/// Re-tag a failed startup command as a connection error, keeping its message
fn startup_error(err: WorkerError) -> WorkerError {
    match err {
        WorkerError::Queue(message) => WorkerError::Connection(message),
        other => other,
    }
}
