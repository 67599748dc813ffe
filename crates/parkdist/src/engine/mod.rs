//! Orchestration of a nearest-pair run.
//!
//! [`NearestPairEngine::run`] wires the job queue, worker pool, completion
//! barrier, result channel, and aggregator together in a fixed sequence:
//!
//! 1. Launch every worker and the aggregator.
//! 2. Enqueue all sources.
//! 3. Close the job queue.
//! 4. Wait on the completion barrier.
//! 5. Close the result channel.
//! 6. Read the aggregator's answer.
//!
//! Steps 3 and 5 consume the producer handles, and step 5 is only reachable
//! with the output of step 4, so the order is fixed by the types involved
//! rather than by convention.

use crate::{
    aggregator::{AggregatorHandle, spawn_aggregator},
    barrier::CompletionBarrier,
    config::EngineConfig,
    entity::{CandidatePair, PointEntity, RegionEntity},
    error::{Error, Result},
    geometry::GeometryProvider,
    queue::{job_queue, result_channel},
    worker::{Worker, WorkerReport},
};
use core::time::Duration;
use std::{sync::Arc, time::Instant};

#[cfg(test)]
mod tests;

/// Steps of a run, reported to an observer in the order they complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Workers and the aggregator are running.
    Launched,
    /// Every source is in the job queue.
    SourcesEnqueued,
    /// The job queue is closed.
    JobsClosed,
    /// Every worker has finished.
    WorkersFinished,
    /// The result channel is closed.
    ResultsClosed,
    /// The aggregator's answer has been read.
    Answered,
}

type PhaseObserver = Arc<dyn Fn(Phase) + Send + Sync>;

/// Counters describing one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sources: usize,
    pub targets: usize,
    pub workers: usize,
    pub candidates: u64,
    pub comparisons: u64,
    pub failed_comparisons: u64,
    pub elapsed: Duration,
}

impl RunStats {
    /// Wall-clock duration in fractional milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    fn absorb(&mut self, report: &WorkerReport) {
        self.comparisons += report.comparisons;
        self.failed_comparisons += report.failed_comparisons;
    }
}

/// The final answer of a run plus its statistics.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    answer: Option<CandidatePair>,
    stats: RunStats,
}

impl RunOutcome {
    /// The globally closest pair, or `None` when no pair could be measured.
    pub const fn answer(&self) -> Option<&CandidatePair> {
        self.answer.as_ref()
    }

    pub fn into_answer(self) -> Option<CandidatePair> {
        self.answer
    }

    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }
}

/// Concurrent brute-force search for the closest source/target pair.
pub struct NearestPairEngine<G> {
    config: EngineConfig,
    provider: Arc<G>,
    observer: Option<PhaseObserver>,
}

impl<G: GeometryProvider> NearestPairEngine<G> {
    pub fn new(config: EngineConfig, provider: G) -> Self {
        Self {
            config,
            provider: Arc::new(provider),
            observer: None,
        }
    }

    /// Registers a callback invoked as each [`Phase`] completes.
    #[must_use]
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(Phase) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn observe(&self, phase: Phase) {
        #[cfg(feature = "tracing")]
        tracing::debug!(?phase, "Run phase complete");

        if let Some(observer) = &self.observer {
            observer(phase);
        }
    }

    /// Finds the closest source/target pair.
    ///
    /// An empty source list returns immediately without starting any task. An
    /// empty target list runs the pool, but no worker emits a candidate.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`](crate::Error::InvalidConfig) before any
    ///   task starts.
    /// - [`Error::WorkerFailed`](crate::Error::WorkerFailed) if a worker
    ///   panicked; every other worker is still joined first.
    /// - [`Error::AggregatorFailed`](crate::Error::AggregatorFailed) if no
    ///   answer was published.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(sources = sources.len(), targets = targets.len()))
    )]
    pub async fn run(
        &self,
        sources: Vec<PointEntity>,
        targets: Vec<RegionEntity>,
    ) -> Result<RunOutcome> {
        self.config.validate()?;
        let start = Instant::now();

        let mut stats = RunStats {
            sources: sources.len(),
            targets: targets.len(),
            ..RunStats::default()
        };

        if sources.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::info!("No sources, nothing to compare");
            stats.elapsed = start.elapsed();
            return Ok(RunOutcome {
                answer: None,
                stats,
            });
        }

        let targets: Arc<[Arc<RegionEntity>]> = targets.into_iter().map(Arc::new).collect();
        let (jobs_tx, jobs_rx) = job_queue(sources.len());
        let (results_tx, results_rx) = result_channel(self.config.result_capacity(sources.len()));

        // === Phase 1: launch workers and the aggregator before any work ===
        let aggregator = spawn_aggregator(results_rx);
        let mut barrier = CompletionBarrier::new();
        for worker_id in 0..self.config.num_workers {
            let worker = Worker {
                worker_id,
                jobs: jobs_rx.clone(),
                targets: Arc::clone(&targets),
                provider: Arc::clone(&self.provider),
                results: results_tx.clone(),
                comparison_delay: self.config.comparison_delay,
            };
            barrier.spawn(worker.run());
        }
        // Workers hold the only consumer handles from here on.
        drop(jobs_rx);
        stats.workers = barrier.len();
        self.observe(Phase::Launched);

        // === Phase 2 + 3: enqueue everything, then close ===
        let enqueued = jobs_tx
            .enqueue_all(sources.into_iter().map(Arc::new))
            .await;
        if let Err(e) = enqueued {
            jobs_tx.close();
            results_tx.close();
            return Err(abort_run(barrier, aggregator, e).await);
        }
        self.observe(Phase::SourcesEnqueued);
        jobs_tx.close();
        self.observe(Phase::JobsClosed);

        // === Phase 4: every worker has stopped writing ===
        let reports = barrier.wait().await;
        self.observe(Phase::WorkersFinished);

        // === Phase 5: no writer is left besides our own handle ===
        results_tx.close();
        self.observe(Phase::ResultsClosed);

        // === Phase 6: single published answer ===
        let aggregate = aggregator.answer().await;
        let reports = reports?;
        let aggregate = aggregate?;
        self.observe(Phase::Answered);

        for report in &reports {
            stats.absorb(report);
        }
        stats.candidates = aggregate.received;
        stats.elapsed = start.elapsed();

        #[cfg(feature = "tracing")]
        tracing::info!(
            candidates = stats.candidates,
            comparisons = stats.comparisons,
            failed = stats.failed_comparisons,
            elapsed_ms = stats.elapsed_ms(),
            "Run complete"
        );

        Ok(RunOutcome {
            answer: aggregate.nearest,
            stats,
        })
    }
}

/// Tears down a run whose job queue lost every consumer. Both producer
/// handles must already be closed. Everything is joined before returning; a
/// worker failure is more specific than `cause` and wins.
async fn abort_run(
    barrier: CompletionBarrier<WorkerReport>,
    aggregator: AggregatorHandle,
    cause: Error,
) -> Error {
    let joined = barrier.wait().await;
    if let Err(_e) = aggregator.answer().await {
        #[cfg(feature = "tracing")]
        tracing::warn!("Aggregator unavailable while aborting run: {_e}");
    }
    match joined {
        Err(worker_failure) => worker_failure,
        Ok(_) => cause,
    }
}
