/// Possible causes of failure when creating geometries or neighbor lists
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// The input structure is malformed: invalid cutoff, mismatched lengths,
    /// singular cell along a periodic direction, non-finite positions, ...
    InvalidGeometry(String),
    /// The cell is too thin along a periodic direction to be partitioned into
    /// bins for the requested cutoff
    DegenerateCell(String),
    /// The cutoff is too large compared to the periodic repeat, and would
    /// require too many periodic images to produce a correct neighbor list
    UnboundedImageCount(String),
    /// Got an invalid parameter value in the neighbor list options
    InvalidParameter(String),
    /// Error while serializing/deserializing options
    Json(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidGeometry(e) => write!(f, "invalid geometry: {}", e),
            Error::DegenerateCell(e) => write!(f, "degenerate cell: {}", e),
            Error::UnboundedImageCount(e) => write!(f, "too many periodic images: {}", e),
            Error::InvalidParameter(e) => write!(f, "invalid parameter: {}", e),
            Error::Json(e) => write!(f, "json error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidGeometry(_) |
            Error::DegenerateCell(_) |
            Error::UnboundedImageCount(_) |
            Error::InvalidParameter(_) => None,
            Error::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::Json(error)
    }
}
