//! Coordinates from embedded image metadata.

use crate::model::meta;
use crate::{
    Accuracy, CoordinateFormat, CoordinateSource, ExtractedCoordinate, ExtractionInput, Extractor,
    Result,
};
use async_trait::async_trait;
use geotag_geo::{format_dms, Coordinate};
use geotag_image::{read_gps, read_xmp_location, GpsFix};
use tracing::{debug, warn};

/// Confidence of a hardware GPS fix.
pub const GPS_CONFIDENCE: f64 = 0.98;

/// Accuracy radius when the receiver reports no dilution of precision.
pub const DEFAULT_GPS_RADIUS_M: f64 = 5.0;

/// Meters of uncertainty per unit of dilution of precision.
const METERS_PER_DOP: f64 = 5.0;

/// Confidence of a location name awaiting geocoding.
const LOCATION_NAME_CONFIDENCE: f64 = 0.5;

/// Reads EXIF GPS tags, falling back to XMP location names.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataReader;

impl MetadataReader {
    fn from_fix(fix: GpsFix) -> Option<ExtractedCoordinate> {
        let at = Coordinate::new(fix.latitude, fix.longitude);
        if !at.is_valid() {
            return None;
        }

        let radius = fix.dop.map_or(DEFAULT_GPS_RADIUS_M, |dop| dop * METERS_PER_DOP);

        Some(
            ExtractedCoordinate::new(
                fix.latitude,
                fix.longitude,
                CoordinateSource::MetadataDerived,
                CoordinateFormat::DegreesMinutesSeconds,
                Accuracy::Exact,
                GPS_CONFIDENCE,
                format_dms(&at),
            )
            .with_altitude(fix.altitude)
            .with_radius(radius)
            .with_meta(meta::EXTRACTION_METHOD, "exif:gps"),
        )
    }

    fn from_location_name(name: String) -> ExtractedCoordinate {
        ExtractedCoordinate::new(
            0.0,
            0.0,
            CoordinateSource::MetadataDerived,
            CoordinateFormat::DecimalDegrees,
            Accuracy::Unknown,
            LOCATION_NAME_CONFIDENCE,
            name.clone(),
        )
        .with_meta(meta::EXTRACTION_METHOD, "xmp:location")
        .with_meta(meta::REQUIRES_GEOCODING, true)
        .with_meta(meta::LOCATION_NAME, name)
    }
}

#[async_trait]
impl Extractor for MetadataReader {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn is_applicable(&self, input: &ExtractionInput) -> bool {
        input.is_image()
    }

    async fn extract(&self, input: &ExtractionInput) -> Result<Vec<ExtractedCoordinate>> {
        // A damaged EXIF block only matters when XMP has nothing either.
        let (fix, exif_error) = match read_gps(&input.content) {
            Ok(fix) => (fix, None),
            Err(err) => {
                warn!(document_id = %input.document_id, error = %err, "unreadable EXIF block");
                (None, Some(err))
            }
        };

        if let Some(fix) = fix {
            debug!(document_id = %input.document_id, "EXIF GPS fix found");
            return Ok(Self::from_fix(fix).into_iter().collect());
        }

        if let Some(name) = read_xmp_location(&input.content).and_then(|loc| loc.display_name()) {
            debug!(document_id = %input.document_id, location = %name, "XMP location name found");
            return Ok(vec![Self::from_location_name(name)]);
        }

        match exif_error {
            Some(err) => Err(err.into()),
            None => Ok(Vec::new()),
        }
    }
}
