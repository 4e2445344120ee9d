//! Geocoding for geotag.
//!
//! Forward (name to coordinate) and reverse (coordinate to name) resolution
//! against a static gazetteer. Forward lookups try an exact match, then a
//! fuzzy match, then the city segment of a comma-separated address. Reverse
//! lookups pick the nearest gazetteer entry by great-circle distance.
//!
//! # Example
//!
//! ```
//! use geotag_geocode::GazetteerGeocoder;
//!
//! let geocoder = GazetteerGeocoder::new();
//! let hit = geocoder.lookup("New York City").unwrap();
//! assert_eq!(hit.confidence, 0.95);
//! ```

#![warn(missing_docs)]

mod error;
mod gazetteer;
mod resolver;

pub use error::{GeocodeError, GeocodeErrorCode, Result};
pub use gazetteer::{Gazetteer, GazetteerEntry};
pub use resolver::{
    GazetteerGeocoder, Geocoder, GeocodingResult, ResolutionMethod, ReverseGeocodingResult,
    EXACT_MATCH_CONFIDENCE, MIN_REVERSE_CONFIDENCE,
};
