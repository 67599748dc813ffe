use crate::{
    coords::parse_coordinates,
    error::{KmlError, PlacemarkError, Result},
    model::{Kml, RawPlacemark, RawPolygon},
};
use parkdist::{Placemark, Point, PointEntity, Region, RegionEntity, polygon_from_rings};
use std::path::Path;

/// Entities read from one document plus the placemarks that were dropped.
#[derive(Debug)]
pub struct Loaded<T> {
    pub entities: Vec<T>,
    pub skipped: Vec<Skipped>,
}

/// A placemark left out of a [`Loaded`] set.
#[derive(Clone, Debug, PartialEq)]
pub struct Skipped {
    pub name: String,
    pub reason: PlacemarkError,
}

impl<T> Loaded<T> {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Reads `Point` placemarks (sources) from a KML string.
///
/// # Errors
///
/// [`KmlError::Decode`] if the text is not a KML document. Individual
/// placemarks without a valid point are reported in [`Loaded::skipped`].
pub fn parse_points(xml: &str) -> Result<Loaded<PointEntity>> {
    parse_with(xml, "point", |raw| {
        let text = raw
            .point_coordinates()
            .ok_or(PlacemarkError::MissingGeometry { expected: "point" })?;
        // A point carries one tuple; anything after the first is ignored.
        let coord = parse_coordinates(text)?[0];
        Ok(PointEntity::new(placemark(raw), Point::try_from(coord)?))
    })
}

/// Reads `Polygon` placemarks (targets) from a KML string.
///
/// Every polygon of a `MultiGeometry` becomes a part of the same region, and
/// `innerBoundaryIs` rings become holes.
///
/// # Errors
///
/// [`KmlError::Decode`] if the text is not a KML document. Individual
/// placemarks without a valid polygon are reported in [`Loaded::skipped`].
pub fn parse_regions(xml: &str) -> Result<Loaded<RegionEntity>> {
    parse_with(xml, "region", |raw| {
        let parts = raw
            .polygons()
            .map(polygon)
            .collect::<core::result::Result<Vec<_>, _>>()?;
        if parts.is_empty() {
            return Err(PlacemarkError::MissingGeometry { expected: "polygon" });
        }
        Ok(RegionEntity::new(placemark(raw), Region::new(parts)?))
    })
}

/// Reads source points from a KML file.
pub fn load_points(path: impl AsRef<Path>) -> Result<Loaded<PointEntity>> {
    parse_points(&read(path.as_ref())?)
}

/// Reads target regions from a KML file.
pub fn load_regions(path: impl AsRef<Path>) -> Result<Loaded<RegionEntity>> {
    parse_regions(&read(path.as_ref())?)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| KmlError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn polygon(raw: &RawPolygon) -> core::result::Result<geo::Polygon<f64>, PlacemarkError> {
    let exterior = parse_coordinates(&raw.outer_boundary.ring.coordinates)?;
    let interiors = raw
        .inner_boundaries
        .iter()
        .map(|boundary| parse_coordinates(&boundary.ring.coordinates))
        .collect::<core::result::Result<Vec<_>, _>>()?;
    Ok(polygon_from_rings(exterior, interiors)?)
}

fn placemark(raw: &RawPlacemark) -> Placemark {
    Placemark::new(
        raw.name.trim(),
        raw.description.trim(),
        raw.address.trim(),
    )
}

fn parse_with<T>(
    xml: &str,
    _kind: &'static str,
    build: impl Fn(&RawPlacemark) -> core::result::Result<T, PlacemarkError>,
) -> Result<Loaded<T>> {
    let kml: Kml = quick_xml::de::from_str(xml)?;

    let mut loaded = Loaded {
        entities: Vec::new(),
        skipped: Vec::new(),
    };
    for raw in kml.into_placemarks() {
        match build(&raw) {
            Ok(entity) => loaded.entities.push(entity),
            Err(reason) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(kind = _kind, name = %raw.name.trim(), %reason, "Skipping placemark");
                loaded.skipped.push(Skipped {
                    name: raw.name.trim().to_string(),
                    reason,
                });
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        kind = _kind,
        loaded = loaded.entities.len(),
        skipped = loaded.skipped.len(),
        "Parsed KML placemarks"
    );
    Ok(loaded)
}
