use crate::error::{Error, Result};
use core::time::Duration;

/// Worker count used when none is configured.
pub const DEFAULT_NUM_WORKERS: usize = 30;

/// Runtime configuration for a [`NearestPairEngine`](crate::NearestPairEngine).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of worker tasks draining the job queue.
    pub num_workers: usize,

    /// Capacity of the result channel. `None` sizes it to the number of
    /// sources so workers never wait on the aggregator.
    pub result_buffer_size: Option<usize>,

    /// Artificial pause before each comparison. Only useful for reproducing
    /// throughput characteristics; zero disables it.
    pub comparison_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_NUM_WORKERS,
            result_buffer_size: None,
            comparison_delay: Duration::ZERO,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub const fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    #[must_use]
    pub const fn with_result_buffer_size(mut self, size: usize) -> Self {
        self.result_buffer_size = Some(size);
        self
    }

    #[must_use]
    pub const fn with_comparison_delay(mut self, delay: Duration) -> Self {
        self.comparison_delay = delay;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a zero worker count or a zero
    /// result buffer.
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(Error::InvalidConfig {
                reason: "num_workers must be greater than 0".to_string(),
            });
        }
        if self.result_buffer_size == Some(0) {
            return Err(Error::InvalidConfig {
                reason: "result_buffer_size must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Result channel capacity for a run over `sources` sources.
    pub(crate) fn result_capacity(&self, sources: usize) -> usize {
        self.result_buffer_size.unwrap_or(sources).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.num_workers, DEFAULT_NUM_WORKERS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let err = EngineConfig::default().with_workers(0).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn zero_result_buffer_rejected() {
        let err = EngineConfig::default()
            .with_result_buffer_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn result_capacity_follows_sources_unless_set() {
        let config = EngineConfig::default();
        assert_eq!(config.result_capacity(12), 12);
        assert_eq!(config.result_capacity(0), 1);
        assert_eq!(config.with_result_buffer_size(2).result_capacity(12), 2);
    }
}
