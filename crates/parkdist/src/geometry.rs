//! Point and region geometry plus the [`GeometryProvider`] seam.
//!
//! Both types wrap `geo` geometries that have been validated on construction
//! and are immutable afterwards, so they can be shared across worker tasks
//! without locking.

use crate::error::GeometryError;
use geo::{CoordsIter, Distance, Euclidean, LineString, MultiPolygon};

pub use geo::Coord;

fn validate(coord: Coord) -> Result<Coord, GeometryError> {
    if coord.x.is_finite() && coord.y.is_finite() {
        Ok(coord)
    } else {
        Err(GeometryError::NonFiniteCoordinate {
            x: coord.x,
            y: coord.y,
        })
    }
}

/// A validated point geometry. `x` is longitude, `y` is latitude for
/// geographic data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point(geo::Point<f64>);

impl Point {
    /// Builds a point from finite coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFiniteCoordinate`] if either value is NaN
    /// or infinite.
    pub fn new(x: f64, y: f64) -> Result<Self, GeometryError> {
        Self::try_from(Coord { x, y })
    }

    pub const fn as_geo(&self) -> &geo::Point<f64> {
        &self.0
    }

    pub fn x(&self) -> f64 {
        self.0.x()
    }

    pub fn y(&self) -> f64 {
        self.0.y()
    }

    /// Latitude, for geographic points.
    pub fn lat(&self) -> f64 {
        self.0.y()
    }

    /// Longitude, for geographic points.
    pub fn lng(&self) -> f64 {
        self.0.x()
    }
}

impl TryFrom<Coord> for Point {
    type Error = GeometryError;

    fn try_from(coord: Coord) -> Result<Self, Self::Error> {
        validate(coord).map(|c| Self(c.into()))
    }
}

/// Checks a closed ring: at least four finite positions, last equal to first.
fn ring(coords: Vec<Coord>) -> Result<LineString<f64>, GeometryError> {
    if coords.len() < 4 {
        return Err(GeometryError::RingTooShort { len: coords.len() });
    }
    for coord in &coords {
        validate(*coord)?;
    }
    if coords.first() != coords.last() {
        return Err(GeometryError::RingNotClosed);
    }
    Ok(LineString::new(coords))
}

/// Builds one polygon from an outer ring and any number of holes.
///
/// # Errors
///
/// - [`GeometryError::RingTooShort`] for a ring with fewer than four
///   positions.
/// - [`GeometryError::RingNotClosed`] if a ring's first and last positions
///   differ.
/// - [`GeometryError::NonFiniteCoordinate`] for NaN or infinite values.
pub fn polygon_from_rings(
    exterior: Vec<Coord>,
    interiors: Vec<Vec<Coord>>,
) -> Result<geo::Polygon<f64>, GeometryError> {
    let exterior = ring(exterior)?;
    let interiors = interiors
        .into_iter()
        .map(ring)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(geo::Polygon::new(exterior, interiors))
}

/// A validated region made of one or more polygons, each possibly with holes.
#[derive(Clone, Debug, PartialEq)]
pub struct Region(MultiPolygon<f64>);

impl Region {
    /// Groups `parts` into one region.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::EmptyRegion`] when `parts` is empty.
    /// - [`GeometryError::NonFiniteCoordinate`] for NaN or infinite values.
    pub fn new(parts: Vec<geo::Polygon<f64>>) -> Result<Self, GeometryError> {
        if parts.is_empty() {
            return Err(GeometryError::EmptyRegion);
        }
        let region = MultiPolygon::new(parts);
        for coord in region.coords_iter() {
            validate(coord)?;
        }
        Ok(Self(region))
    }

    /// Single polygon without holes, from `(x, y)` tuples of a closed ring.
    pub fn from_xy(exterior: &[(f64, f64)]) -> Result<Self, GeometryError> {
        let exterior = exterior.iter().map(|&(x, y)| Coord { x, y }).collect();
        Self::new(vec![polygon_from_rings(exterior, Vec::new())?])
    }

    pub fn parts(&self) -> &[geo::Polygon<f64>] {
        &self.0.0
    }

    pub const fn as_geo(&self) -> &MultiPolygon<f64> {
        &self.0
    }
}

/// Measures the distance between a point and a region.
///
/// Implementations must be safe to call from many worker tasks at once. A
/// returned error only excludes that one pair from the search.
pub trait GeometryProvider: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns a [`GeometryError`] when the pair cannot be measured.
    fn distance(&self, point: &Point, region: &Region) -> Result<f64, GeometryError>;
}

impl<F> GeometryProvider for F
where
    F: Fn(&Point, &Region) -> Result<f64, GeometryError> + Send + Sync + 'static,
{
    fn distance(&self, point: &Point, region: &Region) -> Result<f64, GeometryError> {
        self(point, region)
    }
}

/// Euclidean distance in coordinate units. Zero for points inside any part of
/// the region; a point inside a hole measures to the hole's boundary.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlanarDistance;

impl GeometryProvider for PlanarDistance {
    fn distance(&self, point: &Point, region: &Region) -> Result<f64, GeometryError> {
        Ok(Euclidean.distance(point.as_geo(), region.as_geo()))
    }
}
