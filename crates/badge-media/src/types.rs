//! Shared types and constants for badge artwork normalization

use serde::Serialize;

/// Maximum file size for source images (100MB)
pub const MAX_FILE_SIZE: usize = 100 * 1024 * 1024;

/// Maximum image dimension (width or height) - supports flagship phone cameras (200MP)
pub const MAX_IMAGE_DIMENSION: u32 = 16384;

/// Maximum total pixels allowed in an image (50 million pixels)
/// This prevents decompression bombs. At 50M pixels with 4 bytes per pixel (RGBA),
/// this allows ~200MB of decoded image data.
pub const MAX_IMAGE_PIXELS: u64 = 50_000_000;

/// Maximum memory allowed for decoded images in MB (256MB)
pub const MAX_IMAGE_MEMORY_MB: u64 = 256;

/// JPEG quality used when none is configured.
///
/// Matches the quality a browser canvas uses for `image/jpeg` exports when the
/// caller does not pass one.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Media type of every normalized image
pub const NORMALIZED_MIME_TYPE: &str = "image/jpeg";

/// Options controlling validation limits and the output encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Apply the EXIF orientation tag before cropping (default: true)
    pub apply_exif_orientation: bool,
    /// JPEG quality, 1-100 (default: [`DEFAULT_JPEG_QUALITY`])
    pub jpeg_quality: u8,
    /// Maximum allowed dimension for images (default: uses MAX_IMAGE_DIMENSION)
    pub max_dimension: Option<u32>,
    /// Custom file size limit (default: uses MAX_FILE_SIZE)
    pub max_file_size: Option<usize>,
    /// Custom pixel count limit (default: uses MAX_IMAGE_PIXELS)
    pub max_pixels: Option<u64>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            apply_exif_orientation: true,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_dimension: Some(MAX_IMAGE_DIMENSION),
            max_file_size: Some(MAX_FILE_SIZE),
            max_pixels: Some(MAX_IMAGE_PIXELS),
        }
    }
}

impl NormalizeOptions {
    /// Options with every size limit removed.
    ///
    /// The decoded-memory cap still applies.
    pub fn unbounded() -> Self {
        Self {
            max_dimension: None,
            max_file_size: None,
            max_pixels: None,
            ..Default::default()
        }
    }

    /// Set the JPEG quality, clamped to 1-100
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}

/// A user supplied image, as picked from disk or a file input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// Media type declared by whoever supplied the file
    pub mime_type: String,
    /// Original filename
    pub filename: String,
}

impl SourceImage {
    /// Create a new source image
    pub fn new<D, M, F>(data: D, mime_type: M, filename: F) -> Self
    where
        D: Into<Vec<u8>>,
        M: Into<String>,
        F: Into<String>,
    {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
            filename: filename.into(),
        }
    }
}

/// Centered square region inside a source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CropRegion {
    /// Left edge in source pixels
    pub x: u32,
    /// Top edge in source pixels
    pub y: u32,
    /// Side length of the square
    pub side: u32,
}

/// Square JPEG produced from a [`SourceImage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    /// JPEG bytes
    pub data: Vec<u8>,
    /// Original filename of the source
    pub filename: String,
    /// Side length of the output in pixels
    pub side: u32,
    /// Region of the (orientation corrected) source that was kept
    pub crop: CropRegion,
    /// Source dimensions after orientation was applied
    pub source_dimensions: (u32, u32),
}

impl NormalizedImage {
    /// Always [`NORMALIZED_MIME_TYPE`]
    pub fn mime_type(&self) -> &'static str {
        NORMALIZED_MIME_TYPE
    }
}

/// Header-level facts about a source image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    /// Media type detected from the file contents
    pub detected_mime_type: String,
    /// Width and height as stored in the file header
    pub dimensions: (u32, u32),
    /// EXIF orientation tag, when present
    pub orientation: Option<u32>,
    /// Crop that normalization would apply
    pub crop: CropRegion,
}

/// Errors that can occur while normalizing an image
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The input cannot be interpreted as an image
    #[error("Failed to decode image: {reason}")]
    Decode {
        /// Why decoding failed
        reason: String,
    },

    /// Encoding the square image produced no usable output
    #[error("Failed to encode image: {reason}")]
    Encode {
        /// Why encoding failed
        reason: String,
    },

    /// File is too large
    #[error("File size {size} exceeds maximum allowed size {max_size}")]
    FileTooLarge {
        /// The actual file size
        size: usize,
        /// The maximum allowed file size
        max_size: usize,
    },

    /// Declared media type is malformed or not a supported image type
    #[error("Invalid MIME type: {mime_type}")]
    InvalidMimeType {
        /// The offending MIME type
        mime_type: String,
    },

    /// Image dimensions are too large
    #[error("Image dimensions {width}x{height} exceed maximum {max_dimension}")]
    ImageDimensionsTooLarge {
        /// The image width in pixels
        width: u32,
        /// The image height in pixels
        height: u32,
        /// The maximum allowed dimension
        max_dimension: u32,
    },

    /// Image has too many pixels (decompression bomb protection)
    #[error("Image has {total_pixels} pixels, exceeding maximum {max_pixels}")]
    ImageTooManyPixels {
        /// Total number of pixels
        total_pixels: u64,
        /// Maximum allowed pixels
        max_pixels: u64,
    },

    /// Image would require too much memory to decode (decompression bomb protection)
    #[error("Image would require {estimated_mb}MB to decode, exceeding maximum {max_mb}MB")]
    ImageMemoryTooLarge {
        /// Estimated memory requirement in MB
        estimated_mb: u64,
        /// Maximum allowed memory in MB
        max_mb: u64,
    },
}

impl NormalizeError {
    /// Whether the user should be asked to pick a different image.
    ///
    /// Only encoder failures are not the input's fault.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::Encode { .. })
    }
}
