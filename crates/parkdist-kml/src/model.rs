//! Serde view of the KML subset we read. Unknown elements are ignored.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct Kml {
    #[serde(rename = "Document")]
    pub document: Document,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Document {
    #[serde(rename = "Folder")]
    pub folders: Vec<Folder>,
    #[serde(rename = "Placemark")]
    pub placemarks: Vec<RawPlacemark>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Folder {
    #[serde(rename = "Folder")]
    pub folders: Vec<Folder>,
    #[serde(rename = "Placemark")]
    pub placemarks: Vec<RawPlacemark>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawPlacemark {
    pub name: String,
    pub description: String,
    pub address: String,
    #[serde(rename = "Point")]
    pub point: Option<RawPoint>,
    #[serde(rename = "Polygon")]
    pub polygon: Option<RawPolygon>,
    #[serde(rename = "MultiGeometry")]
    pub multi_geometry: Option<RawMultiGeometry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPoint {
    #[serde(default)]
    pub coordinates: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPolygon {
    #[serde(rename = "outerBoundaryIs")]
    pub outer_boundary: RawBoundary,
    #[serde(rename = "innerBoundaryIs", default)]
    pub inner_boundaries: Vec<RawBoundary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBoundary {
    #[serde(rename = "LinearRing")]
    pub ring: RawRing,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRing {
    #[serde(default)]
    pub coordinates: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawMultiGeometry {
    #[serde(rename = "Point")]
    pub points: Vec<RawPoint>,
    #[serde(rename = "Polygon")]
    pub polygons: Vec<RawPolygon>,
}

impl Kml {
    /// Every placemark: top-level first, then folders depth-first.
    pub fn into_placemarks(self) -> Vec<RawPlacemark> {
        let mut out = self.document.placemarks;
        let mut pending: Vec<Folder> = self.document.folders.into_iter().rev().collect();
        while let Some(folder) = pending.pop() {
            out.extend(folder.placemarks);
            pending.extend(folder.folders.into_iter().rev());
        }
        out
    }
}

impl RawPlacemark {
    pub fn point_coordinates(&self) -> Option<&str> {
        self.point
            .as_ref()
            .or_else(|| self.multi_geometry.as_ref()?.points.first())
            .map(|p| p.coordinates.as_str())
    }

    /// The bare polygon and every polygon of a `MultiGeometry`.
    pub fn polygons(&self) -> impl Iterator<Item = &RawPolygon> {
        self.polygon.iter().chain(
            self.multi_geometry
                .iter()
                .flat_map(|multi| multi.polygons.iter()),
        )
    }
}
