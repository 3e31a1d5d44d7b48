//! In-process queue
//!
//! Same pop/push semantics as the Redis list, for tests and dry runs.

use futures::future::{self, BoxFuture, FutureExt};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::WorkQueue;
use crate::error::{Result, WorkerError};

#[derive(Debug, Default)]
pub struct MemoryQueue {
    items: Mutex<VecDeque<String>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue pre-loaded with `items`, head first
    pub fn with_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: Mutex::new(items.into_iter().map(Into::into).collect()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<String>>> {
        self.items
            .lock()
            .map_err(|e| WorkerError::Queue(format!("Queue lock poisoned: {}", e)))
    }
}

impl WorkQueue for MemoryQueue {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn pop(&self) -> BoxFuture<'_, Result<Option<String>>> {
        let result = self.lock().map(|mut items| items.pop_front());
        future::ready(result).boxed()
    }

    fn push<'a>(&'a self, item: &'a str) -> BoxFuture<'a, Result<usize>> {
        let result = self.lock().map(|mut items| {
            items.push_back(item.to_string());
            items.len()
        });
        future::ready(result).boxed()
    }

    fn len(&self) -> BoxFuture<'_, Result<usize>> {
        let result = self.lock().map(|items| items.len());
        future::ready(result).boxed()
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        future::ready(Ok(())).boxed()
    }
}
