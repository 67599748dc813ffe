//! Single-threaded reference scan.
//!
//! Produces the same minimum distance as the concurrent engine for the same
//! inputs. Useful for cross-checking a run and as a baseline in benchmarks.

use crate::{
    entity::{PointEntity, RegionEntity},
    geometry::GeometryProvider,
    worker::NearestScan,
};

/// Closest pair by index into the input slices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequentialAnswer {
    pub source_index: usize,
    pub target_index: usize,
    pub distance: f64,
}

/// Scans every source against every target on the calling thread.
///
/// Ties keep the earliest source, then the earliest target. Failed
/// comparisons are skipped.
pub fn nearest_pair_sequential<G: GeometryProvider>(
    provider: &G,
    sources: &[PointEntity],
    targets: &[RegionEntity],
) -> Option<SequentialAnswer> {
    let mut nearest: Option<SequentialAnswer> = None;

    for (source_index, source) in sources.iter().enumerate() {
        let mut scan = NearestScan::default();
        for (target_index, target) in targets.iter().enumerate() {
            let _ = scan.record(
                target_index,
                provider.distance(source.geometry(), target.geometry()),
            );
        }

        if let Some((target_index, distance)) = scan.best() {
            if nearest.is_none_or(|best| distance < best.distance) {
                nearest = Some(SequentialAnswer {
                    source_index,
                    target_index,
                    distance,
                });
            }
        }
    }

    nearest
}
