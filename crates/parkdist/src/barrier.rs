//! Completion barrier over the worker tasks.
//!
//! Each spawned worker counts as one "done" signal, delivered when its task
//! finishes for any reason: normal return, early exit, or panic. Waiting
//! consumes the barrier and only returns after every worker has been joined,
//! which is what makes it safe to close the result channel afterwards.

use crate::error::{Error, Result};
use core::future::Future;
use tokio::task::JoinSet;

pub struct CompletionBarrier<T> {
    tasks: JoinSet<T>,
}

impl<T: Send + 'static> CompletionBarrier<T> {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    /// Spawns a task whose completion the barrier will wait for.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.tasks.spawn(task);
    }

    /// Number of tasks that have not been joined yet.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Blocks until every task has finished and returns their outputs in
    /// completion order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerFailed`] if any task panicked. The remaining
    /// tasks are still joined first, so nothing is left running.
    pub async fn wait(mut self) -> Result<Vec<T>> {
        let mut outputs = Vec::with_capacity(self.tasks.len());
        let mut failure = None;

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(output) => outputs.push(output),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Worker task failed: {e}");
                    failure.get_or_insert(Error::WorkerFailed {
                        reason: e.to_string(),
                    });
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(outputs),
        }
    }
}

impl<T: Send + 'static> Default for CompletionBarrier<T> {
    fn default() -> Self {
        Self::new()
    }
}
