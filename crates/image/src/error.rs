//! Error types for the image crate.

use thiserror::Error;

/// Result type alias for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur during image operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Unknown image format
    #[error("Unknown image format")]
    UnknownFormat,

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),

    /// EXIF block present but unreadable
    #[error("EXIF error: {0}")]
    Exif(String),
}

/// Error code for integration with geotag-core error handling.
/// Range: 12xxx for image errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageErrorCode {
    /// Unknown image format
    UnknownFormat = 12001,
    /// Invalid image data
    InvalidData = 12002,
    /// Unreadable EXIF
    Exif = 12003,
}

impl ImageError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ImageErrorCode {
        match self {
            ImageError::UnknownFormat => ImageErrorCode::UnknownFormat,
            ImageError::InvalidData(_) => ImageErrorCode::InvalidData,
            ImageError::Exif(_) => ImageErrorCode::Exif,
        }
    }
}

impl From<exif::Error> for ImageError {
    fn from(err: exif::Error) -> Self {
        ImageError::Exif(err.to_string())
    }
}
