//! Image format detection from magic bytes.

use crate::{ImageError, Result};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image
    Gif,
    /// WebP image
    WebP,
    /// AVIF image
    Avif,
    /// BMP image
    Bmp,
    /// TIFF image
    Tiff,
    /// HEIC/HEIF image
    Heic,
}

impl ImageFormat {
    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Avif => "image/avif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Heic => "image/heic",
        }
    }

    /// Get common file extensions for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ImageFormat::Jpeg => &["jpg", "jpeg"],
            ImageFormat::Png => &["png"],
            ImageFormat::Gif => &["gif"],
            ImageFormat::WebP => &["webp"],
            ImageFormat::Avif => &["avif"],
            ImageFormat::Bmp => &["bmp"],
            ImageFormat::Tiff => &["tiff", "tif"],
            ImageFormat::Heic => &["heic", "heif"],
        }
    }

    /// Whether files of this format commonly carry an EXIF block.
    pub fn carries_exif(&self) -> bool {
        matches!(
            self,
            ImageFormat::Jpeg
                | ImageFormat::Tiff
                | ImageFormat::Heic
                | ImageFormat::WebP
                | ImageFormat::Png
                | ImageFormat::Avif
        )
    }

    /// Look up a format by MIME type, ignoring case and parameters.
    ///
    /// ```
    /// use geotag_image::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_mime("IMAGE/JPEG; q=0.9"), Some(ImageFormat::Jpeg));
    /// assert_eq!(ImageFormat::from_mime("image/jpg"), Some(ImageFormat::Jpeg));
    /// assert_eq!(ImageFormat::from_mime("text/plain"), None);
    /// ```
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/jpg" | "image/pjpeg" => Some(ImageFormat::Jpeg),
            "image/heif" => Some(ImageFormat::Heic),
            "image/tif" => Some(ImageFormat::Tiff),
            other => ALL_FORMATS.iter().copied().find(|f| f.mime_type() == other),
        }
    }

    /// Look up a format by the extension of a file name.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        ALL_FORMATS.iter().copied().find(|f| f.extensions().contains(&ext.as_str()))
    }
}

const ALL_FORMATS: [ImageFormat; 8] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Avif,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
    ImageFormat::Heic,
];

/// Decide whether a document is an image.
///
/// An `image/*` MIME type settles it; otherwise the magic bytes are checked,
/// then the file name extension.
pub fn is_image(content: &[u8], mime_type: Option<&str>, filename: Option<&str>) -> bool {
    if let Some(mime) = mime_type {
        if mime.trim().to_ascii_lowercase().starts_with("image/") {
            return true;
        }
    }

    detect_format(content).is_ok() || filename.and_then(ImageFormat::from_filename).is_some()
}

/// Detect image format from magic bytes.
///
/// # Arguments
/// * `data` - First few bytes of the image file (at least 12 bytes recommended)
///
/// # Returns
/// Detected image format, or error if unknown
///
/// # Example
/// ```
/// use geotag_image::detect_format;
///
/// // JPEG magic bytes
/// let jpeg_data = [0xFF, 0xD8, 0xFF, 0xE0];
/// assert!(matches!(detect_format(&jpeg_data), Ok(geotag_image::ImageFormat::Jpeg)));
///
/// // PNG magic bytes
/// let png_data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// assert!(matches!(detect_format(&png_data), Ok(geotag_image::ImageFormat::Png)));
/// ```
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 4 {
        return Err(ImageError::InvalidData("Not enough data for format detection".into()));
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(ImageFormat::Jpeg);
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Ok(ImageFormat::Png);
    }

    // GIF: GIF87a or GIF89a
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Ok(ImageFormat::Gif);
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Ok(ImageFormat::WebP);
    }

    // BMP: BM
    if data.starts_with(b"BM") {
        return Ok(ImageFormat::Bmp);
    }

    // TIFF: II or MM (little/big endian)
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return Ok(ImageFormat::Tiff);
    }

    // AVIF: ....ftypavif or ....ftypavis
    if data.len() >= 12 {
        if &data[4..8] == b"ftyp" {
            let brand = &data[8..12];
            if brand == b"avif" || brand == b"avis" {
                return Ok(ImageFormat::Avif);
            }
            // HEIC: ....ftypheic, heix or the generic mif1 brand
            if brand == b"heic" || brand == b"heix" || brand == b"mif1" {
                return Ok(ImageFormat::Heic);
            }
        }
    }

    Err(ImageError::UnknownFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_jpeg() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
        assert_eq!(detect_format(&data).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_detect_png() {
        let data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];
        assert_eq!(detect_format(&data).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_detect_gif() {
        let data = b"GIF89a\x00\x00\x00\x00";
        assert_eq!(detect_format(data).unwrap(), ImageFormat::Gif);
    }

    #[test]
    fn test_detect_webp() {
        let data = b"RIFF\x00\x00\x00\x00WEBP";
        assert_eq!(detect_format(data).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_unknown_format() {
        let data = [0x00, 0x00, 0x00, 0x00];
        assert!(detect_format(&data).is_err());
    }

    #[test]
    fn test_detect_tiff_and_heic() {
        assert_eq!(detect_format(&[0x49, 0x49, 0x2A, 0x00]).unwrap(), ImageFormat::Tiff);
        let heic = b"\x00\x00\x00\x18ftypheic";
        assert_eq!(detect_format(heic).unwrap(), ImageFormat::Heic);
        let mif1 = b"\x00\x00\x00\x18ftypmif1";
        assert_eq!(detect_format(mif1).unwrap(), ImageFormat::Heic);
    }

    #[test]
    fn test_from_filename() {
        assert_eq!(ImageFormat::from_filename("IMG_0042.JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_filename("scan.tif"), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::from_filename("report.pdf"), None);
        assert_eq!(ImageFormat::from_filename("README"), None);
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(b"", Some("image/png"), None));
        assert!(is_image(&[0xFF, 0xD8, 0xFF, 0xE1], Some("application/octet-stream"), None));
        assert!(is_image(b"", None, Some("holiday.heic")));
        assert!(!is_image(b"plain text body", Some("text/plain"), Some("notes.txt")));
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
        assert_eq!(ImageFormat::WebP.mime_type(), "image/webp");
    }
    mod props {
        use super::super::{detect_format, ImageFormat, ALL_FORMATS};
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_detect_never_panics(data in proptest::collection::vec(any::<u8>(), 0..64)) {
                let _ = detect_format(&data);
            }

            #[test]
            fn prop_mime_type_maps_back(index in 0usize..ALL_FORMATS.len()) {
                let format = ALL_FORMATS[index];
                prop_assert_eq!(ImageFormat::from_mime(format.mime_type()), Some(format));
            }

            #[test]
            fn prop_extensions_map_back(index in 0usize..ALL_FORMATS.len()) {
                let format = ALL_FORMATS[index];
                for ext in format.extensions() {
                    let name = format!("photo.{}", ext.to_uppercase());
                    prop_assert_eq!(ImageFormat::from_filename(&name), Some(format));
                }
            }
        }
    }
}
