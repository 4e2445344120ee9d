//! Data model shared by extractors, the orchestrator and the stores.

use chrono::{DateTime, Utc};
use geotag_core::config::ExtractionSettings;
use geotag_geo::Coordinate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Open key-value bag of extractor diagnostics.
pub type Metadata = BTreeMap<String, Value>;

/// Well-known metadata keys.
pub mod meta {
    /// Verbatim text the coordinate was parsed from
    pub const RAW_TEXT: &str = "rawText";
    /// Extractor and pattern that produced the coordinate, e.g. `regex:utm`
    pub const EXTRACTION_METHOD: &str = "extractionMethod";
    /// Placeholder coordinate, format recognized but not converted
    pub const REQUIRES_CONVERSION: &str = "requiresConversion";
    /// Placeholder coordinate, only a place name is known
    pub const REQUIRES_GEOCODING: &str = "requiresGeocoding";
    /// Place name awaiting geocoding
    pub const LOCATION_NAME: &str = "locationName";
}

/// Where a coordinate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinateSource {
    /// Embedded file metadata such as EXIF
    MetadataDerived,
    /// Free-text pattern
    TextPattern,
    /// Entered by a person
    Manual,
    /// Heuristic text analysis
    HeuristicText,
    /// Coordinate grammar
    Regex,
    /// Satellite imagery metadata
    SatelliteMetadata,
}

/// Notation the coordinate was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateFormat {
    /// `40.7128, -74.0060`
    #[serde(rename = "decimal-degrees")]
    DecimalDegrees,
    /// `40°42'46"N`
    #[serde(rename = "degrees-minutes-seconds")]
    DegreesMinutesSeconds,
    /// `40°42.767'N`
    #[serde(rename = "degrees-decimal-minutes")]
    DegreesDecimalMinutes,
    /// `18T 585628 4511322`
    #[serde(rename = "UTM")]
    Utm,
    /// `18TWL8562811322`
    #[serde(rename = "MGRS")]
    Mgrs,
}

impl CoordinateFormat {
    /// Short tag used in extraction-method metadata.
    pub fn tag(&self) -> &'static str {
        match self {
            CoordinateFormat::DecimalDegrees => "decimal-degrees",
            CoordinateFormat::DegreesMinutesSeconds => "dms",
            CoordinateFormat::DegreesDecimalMinutes => "ddm",
            CoordinateFormat::Utm => "utm",
            CoordinateFormat::Mgrs => "mgrs",
        }
    }
}

/// How much a coordinate can be trusted as a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    /// Precise fix
    Exact,
    /// Close, e.g. converted grid reference or coarse decimals
    Approximate,
    /// Inferred, e.g. a city centroid
    Estimated,
    /// Not a position; coordinates are placeholders
    Unknown,
}

/// Postal address fields, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Free-form address line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// City
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Region or state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Country
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Address {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.city.is_none()
            && self.region.is_none()
            && self.country.is_none()
    }
}

/// A coordinate candidate produced by an extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedCoordinate {
    /// Decimal latitude
    pub latitude: f64,
    /// Decimal longitude
    pub longitude: f64,
    /// Meters, negative below sea level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Producer
    pub source: CoordinateSource,
    /// Notation in the source
    pub original_format: CoordinateFormat,
    /// Trust level
    pub accuracy: Accuracy,
    /// Uncertainty radius in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_radius: Option<f64>,
    /// Verbatim snippet
    pub extracted_text: String,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Diagnostics
    #[serde(default)]
    pub metadata: Metadata,
    /// Backfilled address
    #[serde(flatten)]
    pub address: Address,
}

impl ExtractedCoordinate {
    /// Minimal candidate; callers fill in the rest with the builder methods.
    pub fn new(
        latitude: f64,
        longitude: f64,
        source: CoordinateSource,
        original_format: CoordinateFormat,
        accuracy: Accuracy,
        confidence: f64,
        extracted_text: impl Into<String>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            source,
            original_format,
            accuracy,
            accuracy_radius: None,
            extracted_text: extracted_text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            metadata: Metadata::new(),
            address: Address::default(),
        }
    }

    /// Set the accuracy radius.
    pub fn with_radius(mut self, meters: f64) -> Self {
        self.accuracy_radius = Some(meters);
        self
    }

    /// Set the altitude.
    pub fn with_altitude(mut self, meters: Option<f64>) -> Self {
        self.altitude = meters;
        self
    }

    /// Add a metadata entry.
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Set address fields.
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    /// Position as a [`Coordinate`].
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Placeholder rather than a real position.
    pub fn is_placeholder(&self) -> bool {
        self.accuracy == Accuracy::Unknown
    }

    /// Flag lookup in the metadata bag.
    pub fn flag(&self, key: &str) -> bool {
        self.metadata.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Any address field set.
    pub fn has_address(&self) -> bool {
        !self.address.is_empty()
    }
}

/// Who triggered an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User or service id
    pub id: String,
    /// Contact email, if known
    pub email: Option<String>,
}

impl Actor {
    /// Actor with an email.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self { id: id.into(), email: Some(email.into()) }
    }

    /// Background process.
    pub fn system() -> Self {
        Self { id: "system".to_string(), email: None }
    }
}

/// Persisted coordinate attached to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoTag {
    /// Assigned by the store
    pub id: Uuid,
    /// Owning document
    pub document_id: String,
    /// Coordinate values, immutable once saved
    #[serde(flatten)]
    pub coordinate: ExtractedCoordinate,
    /// Actor id that created the tag
    pub extracted_by: String,
    /// Actor email that created the tag
    pub extracted_by_email: Option<String>,
    /// Verifying actor id
    pub verified_by: Option<String>,
    /// Verification time
    pub verified_at: Option<DateTime<Utc>>,
    /// Verified by a person
    pub is_verified: bool,
    /// Soft-deletion flag
    pub is_active: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last verification or deactivation
    pub updated_at: DateTime<Utc>,
}

/// Geo-tag before the store assigns an id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGeoTag {
    /// Owning document
    pub document_id: String,
    /// Coordinate values
    pub coordinate: ExtractedCoordinate,
    /// Creating actor
    pub extracted_by: Actor,
}

impl NewGeoTag {
    /// Materialize with a fresh id and the given timestamp.
    pub fn into_geo_tag(self, now: DateTime<Utc>) -> GeoTag {
        GeoTag {
            id: Uuid::new_v4(),
            document_id: self.document_id,
            coordinate: self.coordinate,
            extracted_by: self.extracted_by.id,
            extracted_by_email: self.extracted_by.email,
            verified_by: None,
            verified_at: None,
            is_verified: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Manual geo-tag entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGeoTagDto {
    /// Owning document
    pub document_id: String,
    /// Decimal latitude
    pub latitude: f64,
    /// Decimal longitude
    pub longitude: f64,
    /// Meters
    #[serde(default)]
    pub altitude: Option<f64>,
    /// Defaults to exact
    #[serde(default)]
    pub accuracy: Option<Accuracy>,
    /// Meters
    #[serde(default)]
    pub accuracy_radius: Option<f64>,
    /// Free-form note of what was entered
    #[serde(default)]
    pub extracted_text: Option<String>,
    /// Address, backfilled when empty
    #[serde(flatten)]
    pub address: Address,
}

impl CreateGeoTagDto {
    /// Entry with only the required fields.
    pub fn new(document_id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            document_id: document_id.into(),
            latitude,
            longitude,
            altitude: None,
            accuracy: None,
            accuracy_radius: None,
            extracted_text: None,
            address: Address::default(),
        }
    }
}

/// Per-run switches for the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Run opt-in extractors such as the heuristic one
    pub use_ai: bool,
    /// Backfill addresses by reverse geocoding
    pub reverse_geocode: bool,
    /// Extract again even when active tags exist
    pub force_reextraction: bool,
    /// Drop candidates below this confidence after deduplication
    pub min_confidence: f64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::from(&ExtractionSettings::default())
    }
}

impl From<&ExtractionSettings> for ExtractOptions {
    fn from(settings: &ExtractionSettings) -> Self {
        Self {
            use_ai: settings.use_ai,
            reverse_geocode: settings.reverse_geocode,
            force_reextraction: settings.force_reextraction,
            min_confidence: settings.min_confidence,
        }
    }
}
