#![doc = include_str!("../README.md")]

mod aggregator;
mod barrier;
mod config;
mod engine;
mod entity;
mod error;
mod geometry;
mod queue;
mod reference;
mod worker;

pub use crate::aggregator::*;
pub use crate::barrier::*;
pub use crate::config::*;
pub use crate::engine::*;
pub use crate::entity::*;
pub use crate::error::*;
pub use crate::geometry::*;
pub use crate::queue::*;
pub use crate::reference::*;
pub use crate::worker::WorkerReport;
