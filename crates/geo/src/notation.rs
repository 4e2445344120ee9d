//! Conversions between coordinate notations and decimal degrees.
//!
//! Supported notations:
//! - Degrees-minutes-seconds (DMS): `40°42'46"N`
//! - Degrees-decimal-minutes (DDM): `40°42.767'N`
//! - UTM grid references: `18T 585628 4511322` (approximate, see
//!   [`utm_to_decimal_approx`])
//!
//! The reverse direction, decimal degrees to DMS, is provided for display.

use crate::{Coordinate, GeoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Meters spanned by one degree of latitude on the mean sphere.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// UTM false easting applied to every zone.
const FALSE_EASTING: f64 = 500_000.0;

/// UTM false northing applied in the southern hemisphere.
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Which axis a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Latitude,
    Longitude,
}

/// Compass hemisphere letter attached to a DMS or DDM value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Parse a hemisphere letter (case-insensitive).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Hemisphere::North),
            'S' => Some(Hemisphere::South),
            'E' => Some(Hemisphere::East),
            'W' => Some(Hemisphere::West),
            _ => None,
        }
    }

    /// Hemisphere of a signed decimal value on the given axis.
    ///
    /// Zero maps to North/East.
    pub fn for_value(value: f64, axis: Axis) -> Self {
        match (axis, value < 0.0) {
            (Axis::Latitude, false) => Hemisphere::North,
            (Axis::Latitude, true) => Hemisphere::South,
            (Axis::Longitude, false) => Hemisphere::East,
            (Axis::Longitude, true) => Hemisphere::West,
        }
    }

    /// Axis this hemisphere letter describes.
    pub fn axis(&self) -> Axis {
        match self {
            Hemisphere::North | Hemisphere::South => Axis::Latitude,
            Hemisphere::East | Hemisphere::West => Axis::Longitude,
        }
    }

    /// -1 for South and West, +1 otherwise.
    pub fn sign(&self) -> f64 {
        match self {
            Hemisphere::South | Hemisphere::West => -1.0,
            Hemisphere::North | Hemisphere::East => 1.0,
        }
    }

    /// Single-letter form.
    pub fn as_char(&self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }
}

/// A value split into whole degrees, whole minutes and fractional seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dms {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: f64,
    pub hemisphere: Hemisphere,
}

impl Dms {
    /// Signed decimal degrees.
    pub fn to_decimal(&self) -> f64 {
        dms_to_decimal(
            f64::from(self.degrees),
            f64::from(self.minutes),
            self.seconds,
            self.hemisphere,
        )
    }
}

impl fmt::Display for Dms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}°{:02}'{:05.2}\"{}",
            self.degrees,
            self.minutes,
            self.seconds,
            self.hemisphere.as_char()
        )
    }
}

/// `decimal = deg + min/60 + sec/3600`, negated for South and West.
#[inline]
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, hemisphere: Hemisphere) -> f64 {
    hemisphere.sign() * (degrees + minutes / 60.0 + seconds / 3600.0)
}

/// `decimal = deg + min/60`, negated for South and West.
#[inline]
pub fn ddm_to_decimal(degrees: f64, minutes: f64, hemisphere: Hemisphere) -> f64 {
    hemisphere.sign() * (degrees + minutes / 60.0)
}

/// Split signed decimal degrees into DMS components.
///
/// # Example
/// ```
/// use geotag_geo::{decimal_to_dms, Axis, Hemisphere};
///
/// let dms = decimal_to_dms(-74.0061, Axis::Longitude);
/// assert_eq!(dms.degrees, 74);
/// assert_eq!(dms.minutes, 0);
/// assert_eq!(dms.hemisphere, Hemisphere::West);
/// ```
pub fn decimal_to_dms(decimal: f64, axis: Axis) -> Dms {
    let hemisphere = Hemisphere::for_value(decimal, axis);
    let abs = decimal.abs();

    let mut degrees = abs.trunc();
    let minutes_total = (abs - degrees) * 60.0;
    let mut minutes = minutes_total.trunc();
    let mut seconds = (minutes_total - minutes) * 60.0;

    // Floating error can leave 59.99999 minutes that round up to 60.
    if seconds >= 60.0 - 1e-6 {
        seconds = 0.0;
        minutes += 1.0;
    }
    if minutes >= 60.0 {
        minutes = 0.0;
        degrees += 1.0;
    }

    Dms {
        degrees: degrees as u32,
        minutes: minutes as u32,
        seconds,
        hemisphere,
    }
}

/// Format a coordinate as `40°42'46.08"N, 74°00'21.60"W`.
pub fn format_dms(coord: &Coordinate) -> String {
    format!(
        "{}, {}",
        decimal_to_dms(coord.latitude, Axis::Latitude),
        decimal_to_dms(coord.longitude, Axis::Longitude)
    )
}

/// A UTM grid reference: zone number, latitude band letter, offsets in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtmReference {
    /// Zone number, 1 to 60
    pub zone: u8,
    /// Latitude band letter, C to X without I and O
    pub band: char,
    /// Meters east, including the 500 km false easting
    pub easting: f64,
    /// Meters north, including the southern false northing
    pub northing: f64,
}

impl UtmReference {
    /// Latitude bands C..X run south to north; I and O are skipped.
    fn band_is_valid(band: char) -> bool {
        matches!(band, 'C'..='X') && band != 'I' && band != 'O'
    }

    /// Bands below N lie in the southern hemisphere.
    pub fn is_southern(&self) -> bool {
        self.band.to_ascii_uppercase() < 'N'
    }
}

/// Approximate UTM → decimal degrees conversion.
///
/// This is a flat, non-ellipsoidal approximation: the false easting and (for
/// southern bands) false northing are subtracted, northing is divided by
/// [`METERS_PER_DEGREE`], and the easting offset is scaled by `cos(lat)`
/// around the zone's central meridian. No datum or scale factor is applied,
/// so results can be off by tens of kilometers. Callers tag these results
/// as approximate.
///
/// # Example
/// ```
/// use geotag_geo::{utm_to_decimal_approx, UtmReference};
///
/// let utm = UtmReference { zone: 18, band: 'T', easting: 585628.0, northing: 4511322.0 };
/// let coord = utm_to_decimal_approx(&utm).unwrap();
/// assert!((coord.latitude - 40.53).abs() < 0.01);
/// assert!((coord.longitude - -73.99).abs() < 0.01);
/// ```
pub fn utm_to_decimal_approx(utm: &UtmReference) -> Result<Coordinate> {
    if !(1..=60).contains(&utm.zone) {
        return Err(GeoError::InvalidGridReference(format!("zone {} outside 1-60", utm.zone)));
    }
    let band = utm.band.to_ascii_uppercase();
    if !UtmReference::band_is_valid(band) {
        return Err(GeoError::InvalidGridReference(format!("latitude band {}", utm.band)));
    }
    if !utm.easting.is_finite() || !utm.northing.is_finite() {
        return Err(GeoError::InvalidGridReference("non-finite offset".to_string()));
    }

    let central_meridian = f64::from(utm.zone) * 6.0 - 183.0;
    let northing = if utm.is_southern() {
        utm.northing - FALSE_NORTHING_SOUTH
    } else {
        utm.northing
    };

    let latitude = northing / METERS_PER_DEGREE;
    let meters_per_longitude_degree = METERS_PER_DEGREE * latitude.to_radians().cos();
    let longitude = central_meridian + (utm.easting - FALSE_EASTING) / meters_per_longitude_degree;

    Coordinate::try_new(latitude, longitude)
}
