//! Source and target entities, and the candidate pairs exchanged between
//! workers and the aggregator.

use crate::geometry::{Point, Region};
use std::sync::Arc;

/// Descriptive attributes shared by every entity kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Placemark {
    pub name: String,
    pub description: String,
    pub address: String,
}

impl Placemark {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            address: address.into(),
        }
    }

    /// A placemark carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A point-located entity (a source).
#[derive(Clone, Debug, PartialEq)]
pub struct PointEntity {
    placemark: Placemark,
    geometry: Point,
}

impl PointEntity {
    pub const fn new(placemark: Placemark, geometry: Point) -> Self {
        Self {
            placemark,
            geometry,
        }
    }

    pub const fn placemark(&self) -> &Placemark {
        &self.placemark
    }

    pub fn name(&self) -> &str {
        &self.placemark.name
    }

    pub const fn geometry(&self) -> &Point {
        &self.geometry
    }
}

/// A region-bounded entity (a target).
#[derive(Clone, Debug, PartialEq)]
pub struct RegionEntity {
    placemark: Placemark,
    geometry: Region,
}

impl RegionEntity {
    pub const fn new(placemark: Placemark, geometry: Region) -> Self {
        Self {
            placemark,
            geometry,
        }
    }

    pub const fn placemark(&self) -> &Placemark {
        &self.placemark
    }

    pub fn name(&self) -> &str {
        &self.placemark.name
    }

    pub const fn geometry(&self) -> &Region {
        &self.geometry
    }
}

/// One source together with its nearest target.
///
/// Built by a worker once the source has been compared against every target,
/// then moved through the result channel to the aggregator. The distance is
/// always finite and non-negative.
#[derive(Clone, Debug)]
pub struct CandidatePair {
    source: Arc<PointEntity>,
    target: Arc<RegionEntity>,
    distance: f64,
}

impl CandidatePair {
    pub(crate) fn new(source: Arc<PointEntity>, target: Arc<RegionEntity>, distance: f64) -> Self {
        debug_assert!(distance.is_finite() && distance >= 0.0);
        Self {
            source,
            target,
            distance,
        }
    }

    pub fn source(&self) -> &PointEntity {
        &self.source
    }

    pub fn target(&self) -> &RegionEntity {
        &self.target
    }

    pub const fn distance(&self) -> f64 {
        self.distance
    }
}
