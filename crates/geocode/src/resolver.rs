//! Forward and reverse resolution against a gazetteer.

use crate::{Gazetteer, GazetteerEntry, Result};
use async_trait::async_trait;
use geotag_core::config::GeocodingSettings;
use geotag_geo::{nearest, Axis, Coordinate, Hemisphere};
use geotag_search::{address_segments, best_place_match, normalize_place_name, MatchKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Confidence of an exact gazetteer hit.
pub const EXACT_MATCH_CONFIDENCE: f64 = 0.95;

/// Floor for reverse lookups, and the confidence of a synthesized address.
pub const MIN_REVERSE_CONFIDENCE: f64 = 0.3;

/// How a forward lookup was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    /// Name or alias matched exactly
    Exact,
    /// Containment or edit-distance similarity
    Fuzzy,
    /// Resolved from the city segment of a comma-separated address
    Structured,
}

/// Name to coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResult {
    /// Resolved point
    pub coordinate: Coordinate,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Human-readable address of the matched place
    pub formatted_address: String,
    /// City
    pub city: Option<String>,
    /// Region
    pub region: Option<String>,
    /// Country
    pub country: Option<String>,
    /// How the match was made
    pub method: ResolutionMethod,
}

impl GeocodingResult {
    fn from_entry(entry: &GazetteerEntry, confidence: f64, method: ResolutionMethod) -> Self {
        Self {
            coordinate: entry.coordinate,
            confidence,
            formatted_address: entry.formatted_address(),
            city: entry.city.clone(),
            region: entry.region.clone(),
            country: entry.country.clone(),
            method,
        }
    }
}

/// Coordinate to address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseGeocodingResult {
    /// `Near <place>` or a textual rendering of the raw degrees
    pub address: String,
    /// City
    pub city: Option<String>,
    /// Region
    pub region: Option<String>,
    /// Country
    pub country: Option<String>,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Distance to the matched place, if any
    pub distance_km: Option<f64>,
}

/// A forward and reverse geocoding backend.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a place name to a coordinate.
    async fn geocode(&self, name: &str) -> Result<Option<GeocodingResult>>;

    /// Describe the place at a coordinate.
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<ReverseGeocodingResult>>;

    /// Resolve several names one after another.
    ///
    /// Sequential on purpose so remote backends are never hit concurrently.
    async fn batch_geocode(&self, names: &[String]) -> Result<Vec<Option<GeocodingResult>>> {
        let mut results = Vec::with_capacity(names.len());
        for name in names {
            results.push(self.geocode(name).await?);
        }
        Ok(results)
    }
}

/// Geocoder backed by an in-memory [`Gazetteer`].
#[derive(Debug, Clone)]
pub struct GazetteerGeocoder {
    gazetteer: &'static Gazetteer,
    settings: GeocodingSettings,
}

impl Default for GazetteerGeocoder {
    fn default() -> Self {
        Self::with_settings(&GeocodingSettings::default())
    }
}

impl GazetteerGeocoder {
    /// Built-in gazetteer with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in gazetteer with custom thresholds.
    pub fn with_settings(settings: &GeocodingSettings) -> Self {
        Self {
            gazetteer: Gazetteer::builtin(),
            settings: settings.clone(),
        }
    }

    /// Use a custom gazetteer. It must outlive the geocoder.
    pub fn with_gazetteer(mut self, gazetteer: &'static Gazetteer) -> Self {
        self.gazetteer = gazetteer;
        self
    }

    /// Forward lookup without the async wrapper.
    pub fn lookup(&self, name: &str) -> Option<GeocodingResult> {
        if let Some(result) = self.lookup_key(&normalize_place_name(name)) {
            return Some(result);
        }

        let segments = address_segments(name);
        if segments.len() < 2 {
            return None;
        }

        let city = segments[segments.len() - 2];
        let result = self.lookup_key(&normalize_place_name(city))?;
        debug!(query = name, segment = city, "resolved structured address");

        Some(GeocodingResult {
            confidence: result.confidence * self.settings.structured_discount,
            method: ResolutionMethod::Structured,
            ..result
        })
    }

    fn lookup_key(&self, key: &str) -> Option<GeocodingResult> {
        if key.is_empty() {
            return None;
        }

        if let Some(entry) = self.gazetteer.get(key) {
            return Some(GeocodingResult::from_entry(
                entry,
                EXACT_MATCH_CONFIDENCE,
                ResolutionMethod::Exact,
            ));
        }

        let (index, found) =
            best_place_match(self.gazetteer.keys(), key, self.settings.fuzzy_threshold)?;
        let entry = self.gazetteer.entry(index)?;
        debug!(query = key, matched = %entry.name, score = found.score, "fuzzy gazetteer match");

        let method = if found.kind == MatchKind::Exact {
            ResolutionMethod::Exact
        } else {
            ResolutionMethod::Fuzzy
        };
        Some(GeocodingResult::from_entry(entry, EXACT_MATCH_CONFIDENCE * found.score, method))
    }

    /// Reverse lookup without the async wrapper. Never `None` for a valid point.
    pub fn describe(&self, at: Coordinate) -> ReverseGeocodingResult {
        let radius = self.settings.reverse_radius_km;

        match nearest(&at, self.gazetteer.entries()) {
            Some((entry, distance)) if distance < radius => ReverseGeocodingResult {
                address: format!("Near {}", entry.name),
                city: entry.city.clone(),
                region: entry.region.clone(),
                country: entry.country.clone(),
                confidence: (1.0 - distance / radius).max(MIN_REVERSE_CONFIDENCE),
                distance_km: Some(distance),
            },
            _ => ReverseGeocodingResult {
                address: approximate_address(at),
                city: None,
                region: None,
                country: None,
                confidence: MIN_REVERSE_CONFIDENCE,
                distance_km: None,
            },
        }
    }
}

#[async_trait]
impl Geocoder for GazetteerGeocoder {
    async fn geocode(&self, name: &str) -> Result<Option<GeocodingResult>> {
        Ok(self.lookup(name))
    }

    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<ReverseGeocodingResult>> {
        let at = Coordinate::try_new(latitude, longitude)?;
        Ok(Some(self.describe(at)))
    }
}

/// `40.7000°N, 74.0100°W`
fn approximate_address(at: Coordinate) -> String {
    let ns = Hemisphere::for_value(at.latitude, Axis::Latitude).as_char();
    let ew = Hemisphere::for_value(at.longitude, Axis::Longitude).as_char();
    format!("{:.4}°{}, {:.4}°{}", at.latitude.abs(), ns, at.longitude.abs(), ew)
}
