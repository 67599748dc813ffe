//! Binary plumbing around the nearest-pair engine.
//!
//! - [`config`] - command line and environment options.
//! - [`report`] - text and JSON rendering of a finished run.
//! - [`telemetry`] - log subscriber and optional OpenTelemetry export.

pub mod config;
pub mod report;
pub mod telemetry;
