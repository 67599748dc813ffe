use crate::{
    entity::{CandidatePair, PointEntity, RegionEntity},
    error::GeometryError,
    geometry::GeometryProvider,
    queue::{JobReceiver, ResultSender},
};
use core::time::Duration;
use std::sync::Arc;

/// Running minimum over one source's comparisons.
///
/// Ties keep the earliest target: a later target replaces the current best
/// only when strictly closer.
#[derive(Debug, Default)]
pub(crate) struct NearestScan {
    best: Option<(usize, f64)>,
    pub(crate) comparisons: u64,
    pub(crate) failures: u64,
}

impl NearestScan {
    /// Folds one comparison result into the scan.
    ///
    /// Provider errors, and distances that are negative or not finite, are
    /// counted as failures and returned so the caller can report them.
    pub(crate) fn record(
        &mut self,
        index: usize,
        outcome: Result<f64, GeometryError>,
    ) -> Result<(), GeometryError> {
        self.comparisons += 1;
        let distance = outcome.and_then(|value| {
            if value.is_finite() && value >= 0.0 {
                Ok(value)
            } else {
                Err(GeometryError::InvalidDistance { value })
            }
        });

        match distance {
            Ok(distance) => {
                if self.best.is_none_or(|(_, best)| distance < best) {
                    self.best = Some((index, distance));
                }
                Ok(())
            }
            Err(e) => {
                self.failures += 1;
                Err(e)
            }
        }
    }

    /// Index of the nearest target and its distance, if any comparison
    /// succeeded.
    pub(crate) const fn best(&self) -> Option<(usize, f64)> {
        self.best
    }
}

/// Counters returned by a worker when it stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub sources: u64,
    pub comparisons: u64,
    pub failed_comparisons: u64,
    pub candidates: u64,
}

/// Everything a worker needs, owned so the task is `'static`.
pub(crate) struct Worker<G> {
    pub(crate) worker_id: usize,
    pub(crate) jobs: JobReceiver<Arc<PointEntity>>,
    pub(crate) targets: Arc<[Arc<RegionEntity>]>,
    pub(crate) provider: Arc<G>,
    pub(crate) results: ResultSender,
    pub(crate) comparison_delay: Duration,
}

impl<G: GeometryProvider> Worker<G> {
    /// Drains the job queue until it is empty and closed.
    ///
    /// For each source every target is measured; failed comparisons are
    /// logged and skipped. The nearest target, if any, is sent to the
    /// aggregator as a [`CandidatePair`]. The result sender is dropped when
    /// this returns.
    pub(crate) async fn run(self) -> WorkerReport {
        let mut report = WorkerReport {
            worker_id: self.worker_id,
            ..WorkerReport::default()
        };

        #[cfg(feature = "tracing")]
        tracing::trace!("Worker {} started", self.worker_id);

        while let Some(source) = self.jobs.next().await {
            report.sources += 1;
            let scan = self.scan(&source).await;
            report.comparisons += scan.comparisons;
            report.failed_comparisons += scan.failures;

            if let Some((index, distance)) = scan.best() {
                let pair = CandidatePair::new(source, Arc::clone(&self.targets[index]), distance);
                if let Err(_e) = self.results.send(pair).await {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Worker {} stopping early: {_e}", self.worker_id);
                    break;
                }
                report.candidates += 1;
            }

            // Let the aggregator and the other workers run between sources.
            tokio::task::yield_now().await;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            sources = report.sources,
            candidates = report.candidates,
            "Worker {} stopped",
            self.worker_id
        );

        report
    }

    async fn scan(&self, source: &PointEntity) -> NearestScan {
        let mut scan = NearestScan::default();

        for (index, target) in self.targets.iter().enumerate() {
            if !self.comparison_delay.is_zero() {
                tokio::time::sleep(self.comparison_delay).await;
            }

            let outcome = self.provider.distance(source.geometry(), target.geometry());
            if let Err(_e) = scan.record(index, outcome) {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    worker_id = self.worker_id,
                    source = source.name(),
                    target = target.name(),
                    "Skipping comparison: {_e}"
                );
            }
        }

        scan
    }
}
