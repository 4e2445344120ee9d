//! Heuristic place-name extractor.
//!
//! Stands in for a model-backed extractor. Two signals are combined:
//! known landmarks found by substring match, and place-name phrases that are
//! handed to the [`Geocoder`]. Results are approximate at best, so the
//! orchestrator only runs this extractor when the caller opts in.

use crate::jitter::{JitterSource, RandomJitter};
use crate::model::{meta, Address};
use crate::{
    Accuracy, CoordinateFormat, CoordinateSource, ExtractedCoordinate, ExtractionInput, Extractor,
    Result,
};
use async_trait::async_trait;
use geotag_core::config::HeuristicSettings;
use geotag_geo::notation::METERS_PER_DEGREE;
use geotag_geo::{MAX_LATITUDE, MAX_LONGITUDE};
use geotag_geocode::Geocoder;
use geotag_search::normalize_place_name;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Accuracy radius of a geocoded place name, in meters.
const GEOCODED_RADIUS_M: f64 = 5_000.0;

/// `(name, latitude, longitude)`
const LANDMARKS: &[(&str, f64, f64)] = &[
    ("Eiffel Tower", 48.8584, 2.2945),
    ("Statue of Liberty", 40.6892, -74.0445),
    ("Golden Gate Bridge", 37.8199, -122.4783),
    ("Big Ben", 51.5007, -0.1246),
    ("Colosseum", 41.8902, 12.4922),
    ("Sydney Opera House", -33.8568, 151.2153),
    ("Times Square", 40.7580, -73.9855),
    ("Central Park", 40.7829, -73.9654),
    ("Mount Everest", 27.9881, 86.9250),
    ("Grand Canyon", 36.1069, -112.1129),
    ("Taj Mahal", 27.1751, 78.0421),
    ("Great Pyramid of Giza", 29.9792, 31.1342),
];

static LANDMARK_KEYS: Lazy<Vec<String>> =
    Lazy::new(|| LANDMARKS.iter().map(|(name, _, _)| name.to_lowercase()).collect());

const CAPITALIZED: &str = r"[A-Z][a-z]+(?:\s[A-Z][a-z]+)*";

static CITY_REGION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b({CAPITALIZED}),\s*({CAPITALIZED}|[A-Z]{{2}})\b"))
        .expect("city pattern")
});

static STREET_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b\d{{1,5}}\s+(?:[A-Z][a-z]+\s+){{1,3}}(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Way|Place|Pl)\.?(?:,\s*{CAPITALIZED})+"
    ))
    .expect("street pattern")
});

static NEAR_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:near|at|by)\s+(?:the\s+)?([A-Z][\w'-]*(?:\s+[A-Z][\w'-]*){0,3})")
        .expect("landmark phrase pattern")
});

/// Landmark table plus geocoded place-name phrases.
pub struct HeuristicExtractor {
    geocoder: Arc<dyn Geocoder>,
    jitter: Arc<dyn JitterSource>,
    settings: HeuristicSettings,
}

impl HeuristicExtractor {
    /// Default settings and random jitter.
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            geocoder,
            jitter: Arc::new(RandomJitter),
            settings: HeuristicSettings::default(),
        }
    }

    /// Replace the jitter source.
    pub fn with_jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    /// Replace the settings.
    pub fn with_settings(mut self, settings: &HeuristicSettings) -> Self {
        self.settings = settings.clone();
        self
    }

    fn known_places(&self, text: &str) -> Vec<ExtractedCoordinate> {
        let haystack = text.to_lowercase();
        let spread = self.settings.jitter_degrees;

        LANDMARKS
            .iter()
            .zip(LANDMARK_KEYS.iter())
            .filter(|(_, key)| haystack.contains(key.as_str()))
            .map(|((name, latitude, longitude), _)| {
                let latitude = (latitude + self.jitter.offset(spread))
                    .clamp(-MAX_LATITUDE, MAX_LATITUDE);
                let longitude = (longitude + self.jitter.offset(spread))
                    .clamp(-MAX_LONGITUDE, MAX_LONGITUDE);

                ExtractedCoordinate::new(
                    latitude,
                    longitude,
                    CoordinateSource::HeuristicText,
                    CoordinateFormat::DecimalDegrees,
                    Accuracy::Approximate,
                    self.settings.known_place_confidence,
                    *name,
                )
                .with_radius(spread.max(0.0) * METERS_PER_DEGREE)
                .with_meta(meta::EXTRACTION_METHOD, "heuristic:known-place")
            })
            .collect()
    }

    /// Place-name phrases worth geocoding, in order of appearance per pattern.
    fn place_queries(text: &str) -> Vec<String> {
        let mut seen: HashSet<String> = LANDMARK_KEYS.iter().cloned().collect();
        let mut queries = Vec::new();

        let city_pairs = CITY_REGION.find_iter(text).map(|m| m.as_str());
        let streets = STREET_ADDRESS.find_iter(text).map(|m| m.as_str());
        let phrases = NEAR_PHRASE
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str());

        for query in city_pairs.chain(streets).chain(phrases) {
            let query = query.trim();
            if seen.insert(query.to_lowercase()) && !normalize_place_name(query).is_empty() {
                queries.push(query.to_string());
            }
        }

        queries
    }

    async fn geocoded_places(&self, text: &str) -> Vec<ExtractedCoordinate> {
        let mut found = Vec::new();

        for query in Self::place_queries(text) {
            let result = match self.geocoder.geocode(&query).await {
                Ok(Some(result)) => result,
                Ok(None) => continue,
                Err(err) => {
                    warn!(query = %query, error = %err, "geocoding failed");
                    continue;
                }
            };

            debug!(query = %query, confidence = result.confidence, "place name resolved");
            let confidence = result.confidence.min(self.settings.known_place_confidence);

            found.push(
                ExtractedCoordinate::new(
                    result.coordinate.latitude,
                    result.coordinate.longitude,
                    CoordinateSource::HeuristicText,
                    CoordinateFormat::DecimalDegrees,
                    Accuracy::Estimated,
                    confidence,
                    query.as_str(),
                )
                .with_radius(GEOCODED_RADIUS_M)
                .with_meta(meta::EXTRACTION_METHOD, "heuristic:geocoded")
                .with_address(Address {
                    address: Some(result.formatted_address),
                    city: result.city,
                    region: result.region,
                    country: result.country,
                }),
            );
        }

        found
    }
}

#[async_trait]
impl Extractor for HeuristicExtractor {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn is_applicable(&self, input: &ExtractionInput) -> bool {
        !input.is_image()
    }

    fn requires_opt_in(&self) -> bool {
        true
    }

    async fn extract(&self, input: &ExtractionInput) -> Result<Vec<ExtractedCoordinate>> {
        let length = input.text.chars().count();
        if length < self.settings.min_text_length || length > self.settings.max_text_length {
            debug!(
                document_id = %input.document_id,
                length,
                "text length outside heuristic window"
            );
            return Ok(Vec::new());
        }

        let mut found = self.known_places(&input.text);
        found.extend(self.geocoded_places(&input.text).await);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::{NoJitter, SeededJitter};
    use geotag_geocode::{GazetteerGeocoder, GeocodeError, GeocodingResult, ReverseGeocodingResult};

    struct OfflineGeocoder;

    #[async_trait]
    impl Geocoder for OfflineGeocoder {
        async fn geocode(&self, _name: &str) -> geotag_geocode::Result<Option<GeocodingResult>> {
            Err(GeocodeError::Unavailable("offline".into()))
        }

        async fn reverse_geocode(
            &self,
            _latitude: f64,
            _longitude: f64,
        ) -> geotag_geocode::Result<Option<ReverseGeocodingResult>> {
            Err(GeocodeError::Unavailable("offline".into()))
        }
    }

    fn extractor() -> HeuristicExtractor {
        HeuristicExtractor::new(Arc::new(GazetteerGeocoder::new())).with_jitter(Arc::new(NoJitter))
    }

    #[tokio::test]
    async fn test_landmark_and_city_pair() {
        let input = ExtractionInput::from_text(
            "d1",
            "We met near the Eiffel Tower and later flew to Tokyo, Japan.",
        );
        let found = extractor().extract(&input).await.unwrap();

        assert_eq!(found.len(), 2);

        let tower = &found[0];
        assert_eq!(tower.extracted_text, "Eiffel Tower");
        assert_eq!((tower.latitude, tower.longitude), (48.8584, 2.2945));
        assert_eq!(tower.accuracy, Accuracy::Approximate);
        assert_eq!(tower.confidence, 0.7);

        let tokyo = &found[1];
        assert_eq!(tokyo.extracted_text, "Tokyo, Japan");
        assert_eq!(tokyo.accuracy, Accuracy::Estimated);
        assert_eq!(tokyo.address.country.as_deref(), Some("Japan"));
        assert_eq!(tokyo.confidence, 0.7);
    }

    #[tokio::test]
    async fn test_street_address_uses_city_segment() {
        let input = ExtractionInput::from_text(
            "d2",
            "Deliveries go to 221 Baker Street, London, United Kingdom",
        );
        let found = extractor().extract(&input).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].address.city.as_deref(), Some("London"));
        assert_eq!(found[0].accuracy_radius, Some(GEOCODED_RADIUS_M));
    }

    #[tokio::test]
    async fn test_length_window() {
        let short = ExtractionInput::from_text("d3", "Big Ben");
        assert!(extractor().extract(&short).await.unwrap().is_empty());

        let settings = HeuristicSettings { max_text_length: 20, ..HeuristicSettings::default() };
        let long =
            ExtractionInput::from_text("d4", "A long afternoon walk ending at the Colosseum");
        let found = extractor().with_settings(&settings).extract(&long).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_geocoder_failure_keeps_landmarks() {
        let extractor =
            HeuristicExtractor::new(Arc::new(OfflineGeocoder)).with_jitter(Arc::new(NoJitter));
        let input =
            ExtractionInput::from_text("d5", "Photos from the Taj Mahal, then near Berlin.");
        let found = extractor.extract(&input).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].extracted_text, "Taj Mahal");
    }

    #[tokio::test]
    async fn test_jitter_stays_within_spread() {
        let extractor = HeuristicExtractor::new(Arc::new(GazetteerGeocoder::new()))
            .with_jitter(Arc::new(SeededJitter::new(42)));
        let input = ExtractionInput::from_text("d6", "sunrise over mount everest");
        let found = extractor.extract(&input).await.unwrap();

        assert_eq!(found.len(), 1);
        assert!((found[0].latitude - 27.9881).abs() <= 0.01);
        assert!((found[0].longitude - 86.9250).abs() <= 0.01);
        assert!((found[0].accuracy_radius.unwrap() - 1113.2).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_single_letter_phrase_is_not_a_place() {
        let input =
            ExtractionInput::from_text("d7", "The crates were stored at A warehouse downtown.");
        assert_eq!(HeuristicExtractor::place_queries(&input.text), vec!["A".to_string()]);
        assert!(extractor().extract(&input).await.unwrap().is_empty());
    }

    #[test]
    fn test_queries_are_deduplicated() {
        let queries = HeuristicExtractor::place_queries(
            "Lunch by Paris, France and dinner at Paris, France.",
        );
        assert_eq!(queries, vec!["Paris, France".to_string(), "Paris".to_string()]);
    }

    #[test]
    fn test_opt_in_and_text_only() {
        let heuristic = extractor();
        assert!(heuristic.requires_opt_in());
        assert!(heuristic.is_applicable(&ExtractionInput::from_text("d", "near Rome")));
    }
}
