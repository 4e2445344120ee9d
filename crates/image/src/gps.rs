//! GPS position from EXIF tags.

use crate::Result;
use exif::{Exif, Field, In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Position recorded by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// Signed decimal latitude (negative south)
    pub latitude: f64,
    /// Signed decimal longitude (negative west)
    pub longitude: f64,
    /// Meters above sea level (negative below)
    pub altitude: Option<f64>,
    /// Dilution of precision reported by the receiver
    pub dop: Option<f64>,
}

/// Read the GPS fix from an image container (JPEG, TIFF, HEIF, PNG, WebP).
///
/// A fix needs all four of latitude, latitude ref, longitude and longitude
/// ref; anything less yields `Ok(None)`, as does an image without EXIF.
/// A damaged EXIF block is an error.
pub fn read_gps(data: &[u8]) -> Result<Option<GpsFix>> {
    let mut cursor = Cursor::new(data);
    let exif = match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    Ok(gps_fix(&exif))
}

fn gps_fix(exif: &Exif) -> Option<GpsFix> {
    let latitude = signed_coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S')?;
    let longitude = signed_coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W')?;

    let altitude = field(exif, Tag::GPSAltitude).and_then(|f| single_rational(&f.value)).map(|alt| {
        let below_sea_level = field(exif, Tag::GPSAltitudeRef)
            .and_then(|f| f.value.get_uint(0))
            .is_some_and(|r| r == 1);
        if below_sea_level { -alt } else { alt }
    });

    let dop = field(exif, Tag::GPSDOP).and_then(|f| single_rational(&f.value));

    Some(GpsFix { latitude, longitude, altitude, dop })
}

fn field(exif: &Exif, tag: Tag) -> Option<&Field> {
    exif.get_field(tag, In::PRIMARY)
}

fn signed_coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag, negative_ref: u8) -> Option<f64> {
    let magnitude = dms_rationals(&field(exif, value_tag)?.value)?;
    let hemisphere = ascii_ref(&field(exif, ref_tag)?.value)?;

    if hemisphere.eq_ignore_ascii_case(&negative_ref) {
        Some(-magnitude)
    } else {
        Some(magnitude)
    }
}

/// First byte of an ASCII field such as `N` or `W`.
fn ascii_ref(value: &Value) -> Option<u8> {
    match value {
        Value::Ascii(strings) => strings.first()?.first().copied(),
        _ => None,
    }
}

/// Degrees, minutes, seconds as three rationals.
fn dms_rationals(value: &Value) -> Option<f64> {
    let parts: Vec<f64> = match value {
        Value::Rational(r) if r.len() >= 3 => r.iter().take(3).map(|x| x.to_f64()).collect(),
        Value::SRational(r) if r.len() >= 3 => r.iter().take(3).map(|x| x.to_f64()).collect(),
        _ => return None,
    };

    let decimal = parts[0] + parts[1] / 60.0 + parts[2] / 3600.0;
    decimal.is_finite().then_some(decimal.abs())
}

fn single_rational(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Rational(r) => r.first()?.to_f64(),
        Value::SRational(r) => r.first()?.to_f64(),
        _ => return None,
    };
    v.is_finite().then_some(v)
}
