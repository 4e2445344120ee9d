//! Configuration schema definitions
//!
//! Settings shared by the extractors, the geocoder and the orchestrator.

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// Orchestrator defaults
    #[serde(default)]
    pub extraction: ExtractionSettings,

    /// Heuristic text extractor settings
    #[serde(default)]
    pub heuristic: HeuristicSettings,

    /// Gazetteer geocoder settings
    #[serde(default)]
    pub geocoding: GeocodingSettings,

    /// Audit log settings
    #[serde(default)]
    pub audit: AuditSettings,

    /// Logging settings
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

/// Default options for an extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSettings {
    /// Run the heuristic ("AI") extractor
    #[serde(default)]
    pub use_ai: bool,

    /// Backfill address fields through reverse geocoding
    #[serde(default = "default_true")]
    pub reverse_geocode: bool,

    /// Re-run extraction even when the document already has tags
    #[serde(default)]
    pub force_reextraction: bool,

    /// Candidates below this confidence are dropped after deduplication
    #[serde(default)]
    pub min_confidence: f64,

    /// Two candidates closer than this (in degrees, per axis) are duplicates
    #[serde(default = "default_dedup_epsilon")]
    pub dedup_epsilon: f64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            use_ai: false,
            reverse_geocode: true,
            force_reextraction: false,
            min_confidence: 0.0,
            dedup_epsilon: default_dedup_epsilon(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_dedup_epsilon() -> f64 {
    0.0001
}

/// Heuristic text extractor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicSettings {
    /// Texts shorter than this are ignored
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Texts longer than this are ignored
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Maximum random offset, in degrees, applied to known-place hits
    #[serde(default = "default_jitter_degrees")]
    pub jitter_degrees: f64,

    /// Confidence assigned to known-place hits
    #[serde(default = "default_known_place_confidence")]
    pub known_place_confidence: f64,
}

impl Default for HeuristicSettings {
    fn default() -> Self {
        Self {
            min_text_length: default_min_text_length(),
            max_text_length: default_max_text_length(),
            jitter_degrees: default_jitter_degrees(),
            known_place_confidence: default_known_place_confidence(),
        }
    }
}

fn default_min_text_length() -> usize {
    10
}

fn default_max_text_length() -> usize {
    50_000
}

fn default_jitter_degrees() -> f64 {
    0.01
}

fn default_known_place_confidence() -> f64 {
    0.7
}

/// Gazetteer geocoder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingSettings {
    /// Minimum normalized Levenshtein similarity for a fuzzy hit
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Reverse lookups farther than this fall back to a synthesized address
    #[serde(default = "default_reverse_radius_km")]
    pub reverse_radius_km: f64,

    /// Confidence multiplier for the structured-address fallback
    #[serde(default = "default_structured_discount")]
    pub structured_discount: f64,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            reverse_radius_km: default_reverse_radius_km(),
            structured_discount: default_structured_discount(),
        }
    }
}

fn default_fuzzy_threshold() -> f64 {
    0.6
}

fn default_reverse_radius_km() -> f64 {
    100.0
}

fn default_structured_discount() -> f64 {
    0.8
}

/// Audit log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Log file path; the platform data directory is used when unset
    #[serde(default)]
    pub log_path: Option<String>,

    /// Mirror audit lines to stdout
    #[serde(default)]
    pub stdout: bool,

    /// Write JSON lines instead of the human-readable format
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            log_path: None,
            stdout: false,
            json_format: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySettings {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
