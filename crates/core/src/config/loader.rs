//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use crate::validation::Validator;
use std::path::Path;

/// Environment variable pointing at a configuration file
pub const CONFIG_ENV_VAR: &str = "GEOTAG_CONFIG";

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    /// Parsed settings
    pub schema: ConfigSchema,
    /// File the settings were read from, if any
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// Lookup order: explicit `path`, `$GEOTAG_CONFIG`, then the standard
    /// file names in the working directory.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path
            .map(String::from)
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
            .or_else(find_config_file);

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(Self {
            schema: toml::from_str(content)?,
            path: None,
        })
    }

    /// Load with defaults only (no file)
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }

    /// Check that numeric settings are within their meaningful ranges
    pub fn validate(&self) -> Result<()> {
        let s = &self.schema;
        Validator::new()
            .range("extraction.min_confidence", s.extraction.min_confidence, 0.0, 1.0)
            .range("extraction.dedup_epsilon", s.extraction.dedup_epsilon, 0.0, 1.0)
            .range("geocoding.fuzzy_threshold", s.geocoding.fuzzy_threshold, 0.0, 1.0)
            .range("geocoding.structured_discount", s.geocoding.structured_discount, 0.0, 1.0)
            .range("geocoding.reverse_radius_km", s.geocoding.reverse_radius_km, 0.0, 20_040.0)
            .range("heuristic.jitter_degrees", s.heuristic.jitter_degrees, 0.0, 1.0)
            .range("heuristic.known_place_confidence", s.heuristic.known_place_confidence, 0.0, 1.0)
            .custom("heuristic.max_text_length", || {
                (s.heuristic.max_text_length < s.heuristic.min_text_length)
                    .then(|| "Must not be smaller than min_text_length".to_string())
            })
            .validate()
            .to_result()
            .map_err(|e| Error::new(crate::ErrorCode::ConfigValidationError, e.message))
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = [".geotag.toml", "geotag.toml", ".config/geotag.toml"];

    candidates
        .into_iter()
        .find(|candidate| Path::new(candidate).exists())
        .map(ToString::to_string)
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    if !Path::new(path).exists() {
        return Err(Error::config_not_found(path));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Failed to read config file {path}: {e}")))?;

    toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse config file {path}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = Config::defaults();
        assert!(config.path.is_none());
        assert!(!config.schema.extraction.use_ai);
        assert!(config.schema.extraction.reverse_geocode);
        assert_eq!(config.schema.geocoding.fuzzy_threshold, 0.6);
        assert_eq!(config.schema.heuristic.min_text_length, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [extraction]
            use_ai = true

            [geocoding]
            reverse_radius_km = 50.0
            "#,
        )
        .unwrap();

        assert!(config.schema.extraction.use_ai);
        assert_eq!(config.schema.extraction.dedup_epsilon, 0.0001);
        assert_eq!(config.schema.geocoding.reverse_radius_km, 50.0);
        assert_eq!(config.schema.geocoding.structured_discount, 0.8);
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[heuristic]\nmax_text_length = 2000").unwrap();

        let config = Config::load(file.path().to_str()).unwrap();
        assert_eq!(config.schema.heuristic.max_text_length, 2000);
        assert!(config.path.is_some());
    }

    #[test]
    fn test_config_missing_explicit_file() {
        let err = Config::load(Some("/definitely/not/here.toml")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_config_validation_rejects_bad_ranges() {
        let mut config = Config::defaults();
        config.schema.geocoding.fuzzy_threshold = 1.5;
        config.schema.heuristic.min_text_length = 100;
        config.schema.heuristic.max_text_length = 10;

        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
        assert!(err.message.contains("fuzzy_threshold"));
        assert!(err.message.contains("max_text_length"));
    }
}
