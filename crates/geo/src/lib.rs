//! Geospatial primitives for geotag extraction.
//!
//! This crate provides:
//! - The validated [`Coordinate`] type
//! - Haversine distance calculations
//! - Notation conversions (DMS, DDM, approximate UTM) and DMS formatting
//! - Nearest-point search with optional parallelism
//!
//! # Example
//!
//! ```
//! use geotag_geo::{haversine_distance, Coordinate};
//!
//! let coord1 = Coordinate::new(52.5200, 13.4050); // Berlin
//! let coord2 = Coordinate::new(48.8566, 2.3522);  // Paris
//!
//! let distance_km = haversine_distance(&coord1, &coord2);
//! assert!((distance_km - 878.0).abs() < 10.0); // ~878 km
//! ```

mod haversine;
pub mod nearest;
pub mod notation;
mod error;

pub use haversine::{
    approximate_distance, haversine_distance, haversine_distance_meters, EARTH_RADIUS_KM,
    EARTH_RADIUS_M,
};
pub use nearest::{calculate_distances, nearest, within_radius, DistanceResult, Located};
pub use notation::{
    ddm_to_decimal, decimal_to_dms, dms_to_decimal, format_dms, utm_to_decimal_approx, Axis, Dms,
    Hemisphere, UtmReference,
};
pub use error::{GeoError, GeoErrorCode, Result};

/// Inclusive latitude bound in degrees.
pub const MAX_LATITUDE: f64 = 90.0;

/// Inclusive longitude bound in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate without validating it.
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Creates a coordinate, rejecting NaN and out-of-range values.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self::new(latitude, longitude);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeoError::InvalidCoordinate(format!("({latitude}, {longitude})")))
        }
    }

    /// Returns true if the coordinate has valid values.
    ///
    /// NaN fails every comparison and is therefore never valid.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (-MAX_LATITUDE..=MAX_LATITUDE).contains(&self.latitude)
            && (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&self.longitude)
    }

    /// True when both axes differ by less than `epsilon` degrees.
    #[inline]
    pub fn approx_eq(&self, other: &Coordinate, epsilon: f64) -> bool {
        (self.latitude - other.latitude).abs() < epsilon
            && (self.longitude - other.longitude).abs() < epsilon
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}
