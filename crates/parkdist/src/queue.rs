//! Bounded channels connecting the orchestrator, the workers, and the
//! aggregator.
//!
//! - The **job queue** has one producer and many consumers. Tokio's `mpsc`
//!   receiver is single-consumer, so workers share it behind an async mutex
//!   and take turns pulling the next job.
//! - The **result channel** has many producers (every worker holds a
//!   [`ResultSender`] clone) and a single consumer, the aggregator.
//!
//! Closing is expressed by consuming the producer handle. Once
//! [`JobSender::close`] has run there is no value left to enqueue through, and
//! the receiving side observes `None` only when the queue is both empty and
//! closed.

use crate::{
    entity::CandidatePair,
    error::{Error, Result},
};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Creates a job queue holding up to `capacity` pending jobs.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn job_queue<T>(capacity: usize) -> (JobSender<T>, JobReceiver<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        JobSender { tx },
        JobReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Producer half of the job queue. Not cloneable: there is exactly one
/// producer, and dropping or closing it ends the stream of work.
pub struct JobSender<T> {
    tx: mpsc::Sender<T>,
}

impl<T> JobSender<T> {
    /// Pushes every job onto the queue in order, returning how many were
    /// enqueued.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelError`] if every consumer has gone away.
    pub async fn enqueue_all<I>(&self, jobs: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        let mut enqueued = 0;
        for job in jobs {
            self.tx.send(job).await.map_err(|_| Error::ChannelError {
                context: format!("Job queue has no consumers after {enqueued} jobs"),
            })?;
            enqueued += 1;
        }
        Ok(enqueued)
    }

    /// Signals "no more work". Consumers drain what is left, then stop.
    pub fn close(self) {
        drop(self.tx);
    }
}

/// Consumer half of the job queue, shared by all workers.
pub struct JobReceiver<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> Clone for JobReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
        }
    }
}

impl<T> JobReceiver<T> {
    /// Waits for the next job.
    ///
    /// Returns `None` once the queue is closed and drained. An empty queue
    /// that is still open keeps the caller waiting instead.
    pub async fn next(&self) -> Option<T> {
        self.rx.lock().await.recv().await
    }
}

/// Creates the result channel with room for `capacity` undelivered pairs.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn result_channel(capacity: usize) -> (ResultSender, ResultReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (ResultSender { tx }, ResultReceiver { rx })
}

/// Producer half of the result channel. One clone per worker plus the
/// orchestrator's own handle; the channel closes when the last one is gone.
#[derive(Clone)]
pub struct ResultSender {
    tx: mpsc::Sender<CandidatePair>,
}

impl ResultSender {
    /// # Errors
    ///
    /// Returns [`Error::ChannelError`] if the aggregator is no longer
    /// receiving.
    pub async fn send(&self, pair: CandidatePair) -> Result<()> {
        self.tx.send(pair).await.map_err(|_| Error::ChannelError {
            context: "Result channel closed by aggregator".to_string(),
        })
    }

    /// Releases this handle. The channel closes once every clone is released.
    pub fn close(self) {
        drop(self.tx);
    }
}

/// Consumer half of the result channel, owned by the aggregator.
pub struct ResultReceiver {
    rx: mpsc::Receiver<CandidatePair>,
}

impl ResultReceiver {
    /// Returns `None` once every sender is gone and the buffer is empty.
    pub async fn recv(&mut self) -> Option<CandidatePair> {
        self.rx.recv().await
    }
}
