//! Badge artwork normalization
//!
//! Every Touch Badge is minted with square JPEG artwork. This crate takes the
//! image a user picked, validates it against configurable size limits, applies
//! its EXIF orientation, keeps the centered `min(width, height)` square and
//! re-encodes it as JPEG.
//!
//! ```rust,no_run
//! use badge_media::{NormalizeOptions, SourceImage, normalize_to_square};
//!
//! # fn run(bytes: Vec<u8>) -> Result<(), badge_media::NormalizeError> {
//! let source = SourceImage::new(bytes, "image/png", "badge.png");
//! let square = normalize_to_square(&source, &NormalizeOptions::default())?;
//! assert_eq!(square.mime_type(), "image/jpeg");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

mod normalizer;
mod orientation;
pub mod types;
pub mod validation;

pub use normalizer::{inspect, normalize_to_square, square_crop_region};
pub use types::{
    CropRegion, DEFAULT_JPEG_QUALITY, ImageInfo, MAX_FILE_SIZE, MAX_IMAGE_DIMENSION,
    MAX_IMAGE_PIXELS, NORMALIZED_MIME_TYPE, NormalizeError, NormalizeOptions, NormalizedImage,
    SourceImage,
};
pub use validation::canonical_image_mime_type;
