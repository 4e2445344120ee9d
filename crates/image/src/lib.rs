//! Image inspection for geotag.
//!
//! This crate provides:
//! - Format detection from magic bytes, MIME types and file extensions
//! - GPS position from EXIF tags
//! - Location names from embedded XMP packets

#![warn(missing_docs)]

mod detect;
mod error;
mod gps;
mod xmp;

pub use detect::{detect_format, is_image, ImageFormat};
pub use error::{ImageError, ImageErrorCode, Result};
pub use gps::{read_gps, GpsFix};
pub use xmp::{read_xmp_location, XmpLocation};
