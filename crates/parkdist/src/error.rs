//! Error types for the nearest-pair engine.
//!
//! Two layers of failure exist:
//!
//! - [`GeometryError`]: a single geometry could not be built, or a single
//!   distance comparison failed. Comparison failures are recovered inside the
//!   worker; the target is dropped from consideration for that source.
//! - [`Error`]: the run itself could not complete (bad configuration, a worker
//!   task panicked, the aggregator disappeared).

pub type Result<T> = core::result::Result<T, Error>;

/// Failure to construct a geometry or to measure between two of them.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// A coordinate was NaN or infinite.
    #[error("Non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },

    /// A polygon ring needs at least four positions (three distinct plus the
    /// closing one).
    #[error("Ring has {len} positions, at least 4 are required")]
    RingTooShort { len: usize },

    /// The first and last positions of a ring differ.
    #[error("Ring is not closed")]
    RingNotClosed,

    /// A region needs at least one polygon.
    #[error("Region has no polygons")]
    EmptyRegion,

    /// The provider produced something that is not a usable distance.
    #[error("Invalid distance: {value}")]
    InvalidDistance { value: f64 },

    /// The provider refused the pair.
    #[error("Geometry provider failed: {reason}")]
    Provider { reason: String },
}

/// Unified error type for a nearest-pair run.
#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    /// The engine configuration was rejected before any task started.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Internal channel send/receive failure.
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// A worker task ended abnormally.
    #[error("Worker failed: {reason}")]
    WorkerFailed { reason: String },

    /// The aggregator ended without publishing an answer.
    #[error("Aggregator failed: {reason}")]
    AggregatorFailed { reason: String },

    /// A geometry could not be built.
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}
