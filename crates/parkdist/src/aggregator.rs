//! Fan-in reducer.
//!
//! The aggregator drains the result channel while workers are still running
//! and keeps the closest pair seen so far. It finishes when the channel is
//! closed and empty, then publishes its answer exactly once.

use crate::{
    entity::CandidatePair,
    error::{Error, Result},
    queue::ResultReceiver,
};
use tokio::{sync::oneshot, task::JoinHandle};

/// What the aggregator saw over a whole run.
#[derive(Clone, Debug, Default)]
pub struct Aggregate {
    /// Closest pair, or `None` if no candidate arrived.
    pub nearest: Option<CandidatePair>,
    /// Number of candidates received.
    pub received: u64,
}

impl Aggregate {
    /// Keeps `pair` if it is strictly closer than the current best.
    pub fn offer(&mut self, pair: CandidatePair) {
        self.received += 1;
        if self
            .nearest
            .as_ref()
            .is_none_or(|best| pair.distance() < best.distance())
        {
            self.nearest = Some(pair);
        }
    }
}

/// Handle to a running aggregator.
pub struct AggregatorHandle {
    answer: oneshot::Receiver<Aggregate>,
    task: JoinHandle<()>,
}

/// Starts draining `results` on a new task.
///
/// Must be called before any work is enqueued so a small result buffer never
/// stalls the workers.
pub fn spawn_aggregator(mut results: ResultReceiver) -> AggregatorHandle {
    let (tx, rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        let mut aggregate = Aggregate::default();
        while let Some(pair) = results.recv().await {
            aggregate.offer(pair);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(received = aggregate.received, "Result channel drained");

        if tx.send(aggregate).is_err() {
            #[cfg(feature = "tracing")]
            tracing::warn!("Aggregator answer dropped: receiver gone");
        }
    });

    AggregatorHandle { answer: rx, task }
}

impl AggregatorHandle {
    /// Waits for the published answer and joins the aggregator task.
    ///
    /// Only resolves after the result channel has been closed, so callers must
    /// close it first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AggregatorFailed`] if the task ended without
    /// publishing.
    pub async fn answer(self) -> Result<Aggregate> {
        let published = self.answer.await;
        let joined = self.task.await;

        match (published, joined) {
            (Ok(aggregate), Ok(())) => Ok(aggregate),
            (_, Err(e)) => Err(Error::AggregatorFailed {
                reason: e.to_string(),
            }),
            (Err(e), Ok(())) => Err(Error::AggregatorFailed {
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entity::{Placemark, PointEntity, RegionEntity},
        geometry::{Point, Region},
        queue::result_channel,
    };
    use std::sync::Arc;

    fn pair(source: &str, target: &str, distance: f64) -> CandidatePair {
        let square =
            Region::from_xy(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)])
                .unwrap();
        CandidatePair::new(
            Arc::new(PointEntity::new(
                Placemark::named(source),
                Point::new(0.0, 0.0).unwrap(),
            )),
            Arc::new(RegionEntity::new(Placemark::named(target), square)),
            distance,
        )
    }

    #[test]
    fn offer_replaces_only_when_strictly_smaller() {
        let mut aggregate = Aggregate::default();
        aggregate.offer(pair("a", "x", 4.0));
        aggregate.offer(pair("b", "y", 2.0));
        aggregate.offer(pair("c", "z", 2.0));
        aggregate.offer(pair("d", "w", 3.0));

        let nearest = aggregate.nearest.unwrap();
        assert_eq!(nearest.source().name(), "b");
        assert_eq!(nearest.distance(), 2.0);
        assert_eq!(aggregate.received, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn drains_concurrently_with_a_tiny_buffer() {
        // Capacity 1: producers only make progress because the aggregator is
        // already draining.
        let (tx, rx) = result_channel(1);
        let handle = spawn_aggregator(rx);

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let tx = tx.clone();
                tokio::spawn(async move {
                    for i in 0..25 {
                        let distance = f64::from(p * 100 + i) + 1.0;
                        tx.send(pair("s", "t", distance)).await.unwrap();
                    }
                })
            })
            .collect();

        for producer in producers {
            producer.await.unwrap();
        }
        tx.close();

        let aggregate = handle.answer().await.unwrap();
        assert_eq!(aggregate.received, 100);
        assert_eq!(aggregate.nearest.unwrap().distance(), 1.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn closed_without_candidates_publishes_none() {
        let (tx, rx) = result_channel(4);
        let handle = spawn_aggregator(rx);
        tx.close();

        let aggregate = handle.answer().await.unwrap();
        assert!(aggregate.nearest.is_none());
        assert_eq!(aggregate.received, 0);
    }
}
