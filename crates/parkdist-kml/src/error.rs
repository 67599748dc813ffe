use parkdist::GeometryError;
use std::path::PathBuf;

pub type Result<T> = core::result::Result<T, KmlError>;

/// Failure to load a whole document.
#[derive(Debug, thiserror::Error)]
pub enum KmlError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed KML: {0}")]
    Decode(#[from] quick_xml::DeError),
}

/// Why a single placemark was skipped.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PlacemarkError {
    #[error("No {expected} geometry")]
    MissingGeometry { expected: &'static str },

    #[error(transparent)]
    Coordinates(#[from] CoordinateError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// A `<coordinates>` body that is not a list of `lon,lat[,alt]` tuples.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    #[error("Empty coordinate list")]
    Empty,

    #[error("Malformed coordinate tuple `{tuple}`")]
    MalformedTuple { tuple: String },

    #[error("Invalid number `{value}` in coordinate tuple `{tuple}`")]
    InvalidNumber { tuple: String, value: String },
}
