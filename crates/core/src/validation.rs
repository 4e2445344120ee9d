//! Input validation
//!
//! Provides fluent validation for:
//! - Manual geo-tag entries
//! - Configuration values
//!
//! # Example
//!
//! ```rust
//! use geotag_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("document_id", "doc-42")
//!     .latitude("latitude", 40.7128)
//!     .longitude("longitude", -74.0060)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use crate::error::{Error, ErrorCode, Result};
use serde::{Deserialize, Serialize};

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Convert to Result type
    ///
    /// A bounds failure on a coordinate field reports
    /// [`ErrorCode::CoordinateOutOfBounds`]; everything else reports
    /// [`ErrorCode::ValidationError`].
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }

        let code = if self.errors.iter().all(|e| e.code == "COORDINATE_RANGE") {
            ErrorCode::CoordinateOutOfBounds
        } else {
            ErrorCode::ValidationError
        };
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        Err(Error::new(
            code,
            format!("Validation failed: {}", messages.join("; ")),
        ))
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    #[must_use]
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    fn fail(
        mut self,
        field: &str,
        message: String,
        code: &str,
        expected: Option<String>,
        actual: Option<String>,
    ) -> Self {
        self.result.add_error(ValidationError {
            field: field.to_string(),
            message,
            code: code.to_string(),
            expected,
            actual,
        });
        self
    }

    /// Validate that a field is not empty
    #[must_use]
    pub fn required(self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            return self.fail(
                field,
                "Field is required".to_string(),
                "REQUIRED",
                Some("non-empty value".to_string()),
                Some("empty".to_string()),
            );
        }
        self
    }

    /// Validate a numeric range (inclusive)
    ///
    /// Values that do not compare (NaN) fail the check.
    #[must_use]
    pub fn range<T: PartialOrd + std::fmt::Display>(
        self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if !(value >= min && value <= max) {
            return self.fail(
                field,
                format!("Must be between {min} and {max}"),
                "RANGE",
                Some(format!("{min} - {max}")),
                Some(value.to_string()),
            );
        }
        self
    }

    /// Validate a latitude in decimal degrees
    #[must_use]
    pub fn latitude(self, field: &str, value: f64) -> Self {
        self.coordinate_axis(field, value, 90.0)
    }

    /// Validate a longitude in decimal degrees
    #[must_use]
    pub fn longitude(self, field: &str, value: f64) -> Self {
        self.coordinate_axis(field, value, 180.0)
    }

    fn coordinate_axis(self, field: &str, value: f64, limit: f64) -> Self {
        if !value.is_finite() || value.abs() > limit {
            return self.fail(
                field,
                format!("Must be a finite value between -{limit} and {limit}"),
                "COORDINATE_RANGE",
                Some(format!("-{limit} - {limit}")),
                Some(value.to_string()),
            );
        }
        self
    }

    /// Add a custom validation
    #[must_use]
    pub fn custom<F>(self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        match f() {
            Some(message) => self.fail(field, message, "CUSTOM", None, None),
            None => self,
        }
    }

    /// Complete validation and return result
    #[must_use]
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_required_validation() {
        let result = Validator::new().required("document_id", "  ").validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "REQUIRED");
    }

    #[test]
    fn test_range_rejects_nan() {
        let result = Validator::new().range("confidence", f64::NAN, 0.0, 1.0).validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "RANGE");
    }

    #[test]
    fn test_coordinate_bounds_error_code() {
        let err = Validator::new()
            .latitude("latitude", 91.0)
            .longitude("longitude", -74.0)
            .validate()
            .to_result()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CoordinateOutOfBounds);
        assert!(err.message.contains("latitude"));
    }

    #[test]
    fn test_mixed_failures_use_generic_code() {
        let err = Validator::new()
            .required("document_id", "")
            .longitude("longitude", 200.0)
            .validate()
            .to_result()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    proptest! {
        #[test]
        fn prop_latitude_in_range_is_valid(lat in -90.0f64..=90.0) {
            prop_assert!(Validator::new().latitude("lat", lat).validate().is_valid());
        }

        #[test]
        fn prop_longitude_out_of_range_is_invalid(lon in 180.000_001f64..1000.0) {
            prop_assert!(!Validator::new().longitude("lon", lon).validate().is_valid());
            prop_assert!(!Validator::new().longitude("lon", -lon).validate().is_valid());
        }
    }
}
