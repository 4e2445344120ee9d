//! Error types for the geocode crate.

use geotag_geo::GeoError;
use thiserror::Error;

/// Result type alias for geocoding operations.
pub type Result<T> = std::result::Result<T, GeocodeError>;

/// Errors that can occur while geocoding.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Reverse lookup on a point outside latitude/longitude bounds
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] GeoError),

    /// Backing service could not answer
    #[error("Geocoder unavailable: {0}")]
    Unavailable(String),
}

/// Error code for integration with geotag-core error handling.
/// Range: 13xxx for geocode errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodeErrorCode {
    /// Invalid coordinate
    InvalidCoordinate = 13001,
    /// Geocoder unavailable
    Unavailable = 13002,
}

impl GeocodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeocodeErrorCode {
        match self {
            GeocodeError::InvalidCoordinate(_) => GeocodeErrorCode::InvalidCoordinate,
            GeocodeError::Unavailable(_) => GeocodeErrorCode::Unavailable,
        }
    }
}
