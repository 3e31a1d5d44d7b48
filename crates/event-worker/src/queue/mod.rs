//! Work queue abstraction
//!
//! A queue is a shared FIFO list: producers push to the tail, workers pop
//! from the head. Popping is atomic in the backing store, so an item is
//! handed to at most one worker.

mod memory;
mod redis_queue;

pub use memory::MemoryQueue;
pub use redis_queue::RedisQueue;

use futures::future::{BoxFuture, FutureExt};

use crate::error::Result;

/// Trait for work queue backends
pub trait WorkQueue: Send + Sync {
    /// Backend identifier
    fn backend(&self) -> &'static str;

    /// Pop the head item without blocking; `None` when the queue is empty
    fn pop(&self) -> BoxFuture<'_, Result<Option<String>>>;

    /// Append an item to the tail, returning the new length
    fn push<'a>(&'a self, item: &'a str) -> BoxFuture<'a, Result<usize>>;

    /// Number of items waiting
    fn len(&self) -> BoxFuture<'_, Result<usize>>;

    fn is_empty(&self) -> BoxFuture<'_, Result<bool>> {
        self.len().map(|len| len.map(|n| n == 0)).boxed()
    }

    /// Connectivity check
    fn ping(&self) -> BoxFuture<'_, Result<()>>;
}

impl<Q: WorkQueue + ?Sized> WorkQueue for std::sync::Arc<Q> {
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    fn pop(&self) -> BoxFuture<'_, Result<Option<String>>> {
        (**self).pop()
    }

    fn push<'a>(&'a self, item: &'a str) -> BoxFuture<'a, Result<usize>> {
        (**self).push(item)
    }

    fn len(&self) -> BoxFuture<'_, Result<usize>> {
        (**self).len()
    }

    fn is_empty(&self) -> BoxFuture<'_, Result<bool>> {
        (**self).is_empty()
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        (**self).ping()
    }
}
