//! Error types for the extract crate.

use geotag_geocode::GeocodeError;
use geotag_image::ImageError;
use thiserror::Error;

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors surfaced by extractors, the orchestrator and the geo-tag service.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Malformed input or coordinate out of bounds; nothing was written
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unknown document or geo-tag
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of resource, e.g. `document`
        resource: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The whole document could not be processed
    #[error("Extraction failed for document {document_id}: {reason}")]
    ExtractionFailed {
        /// Document being processed
        document_id: String,
        /// Underlying cause
        reason: String,
    },

    /// Persistence layer rejected a write
    #[error("Persist failed: {0}")]
    Persist(String),

    /// One extraction strategy failed
    #[error("Extractor {extractor} failed: {reason}")]
    Extractor {
        /// Extractor name
        extractor: &'static str,
        /// Underlying cause
        reason: String,
    },

    /// Audit sink rejected an event
    #[error("Audit failed: {0}")]
    Audit(String),

    /// Geocoding backend error
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// Image metadata could not be read
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Error code for integration with geotag-core error handling.
/// Range: 14xxx for extraction errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractErrorCode {
    /// Validation failure
    Validation = 14001,
    /// Unknown resource
    NotFound = 14002,
    /// Whole-document failure
    ExtractionFailed = 14003,
    /// Persistence failure
    Persist = 14004,
    /// Single extractor failure
    Extractor = 14005,
    /// Audit failure
    Audit = 14006,
    /// Geocoder failure
    Geocode = 14007,
    /// Image metadata failure
    Image = 14008,
}

impl ExtractError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ExtractErrorCode {
        match self {
            ExtractError::Validation(_) => ExtractErrorCode::Validation,
            ExtractError::NotFound { .. } => ExtractErrorCode::NotFound,
            ExtractError::ExtractionFailed { .. } => ExtractErrorCode::ExtractionFailed,
            ExtractError::Persist(_) => ExtractErrorCode::Persist,
            ExtractError::Extractor { .. } => ExtractErrorCode::Extractor,
            ExtractError::Audit(_) => ExtractErrorCode::Audit,
            ExtractError::Geocode(_) => ExtractErrorCode::Geocode,
            ExtractError::Image(_) => ExtractErrorCode::Image,
        }
    }

    /// Shorthand for an unknown document.
    pub fn document_not_found(id: impl Into<String>) -> Self {
        ExtractError::NotFound { resource: "document", id: id.into() }
    }

    /// Shorthand for an unknown geo-tag.
    pub fn geo_tag_not_found(id: impl ToString) -> Self {
        ExtractError::NotFound { resource: "geo-tag", id: id.to_string() }
    }
}

impl From<ExtractError> for geotag_core::Error {
    fn from(err: ExtractError) -> Self {
        use geotag_core::Error;

        match err {
            ExtractError::Validation(message) => Error::validation(message),
            ExtractError::NotFound { resource, id } => Error::not_found(resource, id),
            ExtractError::ExtractionFailed { document_id, reason } => {
                Error::extraction_failed(&document_id, reason)
            }
            ExtractError::Persist(message) => Error::persist(message),
            ExtractError::Audit(message) => {
                Error::new(geotag_core::ErrorCode::AuditFailed, message)
            }
            other => Error::new(geotag_core::ErrorCode::Internal, other.to_string()),
        }
    }
}
