//! Input validation for badge artwork
//!
//! Checks run before and after reading the image header so oversized or
//! mislabelled files are rejected before any pixel data is allocated.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};

use crate::types::{MAX_IMAGE_MEMORY_MB, NormalizeError, NormalizeOptions};

/// Image types a badge can be created from
pub(crate) const SUPPORTED_IMAGE_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/bmp",
];

/// Validate file size against limits
pub(crate) fn validate_file_size(
    data: &[u8],
    options: &NormalizeOptions,
) -> Result<(), NormalizeError> {
    let Some(max_size) = options.max_file_size else {
        return Ok(());
    };
    if data.len() > max_size {
        return Err(NormalizeError::FileTooLarge {
            size: data.len(),
            max_size,
        });
    }
    Ok(())
}

/// Canonicalize a declared image MIME type
///
/// Trims, lowercases and strips parameters ("image/png; q=1" -> "image/png"),
/// then enforces the supported image allowlist. `image/jpg` is accepted as an
/// alias some platforms still emit.
pub fn canonical_image_mime_type(mime_type: &str) -> Result<String, NormalizeError> {
    let normalized = mime_type.trim().to_ascii_lowercase();
    let canonical = normalized.split(';').next().unwrap_or(&normalized).trim();

    if !canonical.contains('/') || canonical.len() > 100 {
        return Err(NormalizeError::InvalidMimeType {
            mime_type: mime_type.to_string(),
        });
    }

    let canonical = if canonical == "image/jpg" {
        "image/jpeg"
    } else {
        canonical
    };

    if !SUPPORTED_IMAGE_MIME_TYPES.contains(&canonical) {
        return Err(NormalizeError::InvalidMimeType {
            mime_type: canonical.to_string(),
        });
    }

    Ok(canonical.to_string())
}

/// Map a format sniffed by the `image` crate to its MIME type
pub(crate) fn mime_type_for_format(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        _ => None,
    }
}

/// Detect the actual MIME type from the file's magic bytes
///
/// Returns `Decode` when the data is not a recognisable image, which covers
/// zero-byte input.
pub(crate) fn detect_mime_type_from_data(data: &[u8]) -> Result<&'static str, NormalizeError> {
    let format = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| NormalizeError::Decode {
            reason: format!("could not read image header: {e}"),
        })?
        .format()
        .ok_or_else(|| NormalizeError::Decode {
            reason: "unrecognised image format".to_string(),
        })?;

    mime_type_for_format(format).ok_or_else(|| NormalizeError::Decode {
        reason: format!("unsupported image format: {format:?}"),
    })
}

/// Validate image dimensions against limits
///
/// Checks the per-side limit, the total pixel count and the estimated RGBA
/// memory needed to decode the image.
pub(crate) fn validate_image_dimensions(
    width: u32,
    height: u32,
    options: &NormalizeOptions,
) -> Result<(), NormalizeError> {
    if let Some(max_dim) = options.max_dimension
        && (width > max_dim || height > max_dim)
    {
        return Err(NormalizeError::ImageDimensionsTooLarge {
            width,
            height,
            max_dimension: max_dim,
        });
    }

    let total_pixels = width as u64 * height as u64;

    if let Some(max_pixels) = options.max_pixels
        && total_pixels > max_pixels
    {
        return Err(NormalizeError::ImageTooManyPixels {
            total_pixels,
            max_pixels,
        });
    }

    // RGBA, rounded up
    let estimated_mb = (total_pixels * 4).div_ceil(1024 * 1024);
    if estimated_mb > MAX_IMAGE_MEMORY_MB {
        return Err(NormalizeError::ImageMemoryTooLarge {
            estimated_mb,
            max_mb: MAX_IMAGE_MEMORY_MB,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use badge_test_utils::images::{solid_jpeg, solid_png};

    use super::*;

    #[test]
    fn test_validate_file_size() {
        let options = NormalizeOptions::default();
        assert!(validate_file_size(&[0u8; 1000], &options).is_ok());

        let custom = NormalizeOptions {
            max_file_size: Some(500),
            ..Default::default()
        };
        let result = validate_file_size(&[0u8; 1000], &custom);
        assert!(matches!(
            result,
            Err(NormalizeError::FileTooLarge {
                size: 1000,
                max_size: 500
            })
        ));

        let unbounded = NormalizeOptions::unbounded();
        assert!(validate_file_size(&[0u8; 1000], &unbounded).is_ok());
    }

    #[test]
    fn test_canonical_image_mime_type() {
        assert_eq!(canonical_image_mime_type("image/png").unwrap(), "image/png");
        assert_eq!(canonical_image_mime_type("Image/JPEG").unwrap(), "image/jpeg");
        assert_eq!(canonical_image_mime_type("  image/webp\n").unwrap(), "image/webp");
        assert_eq!(
            canonical_image_mime_type("image/png; charset=utf-8").unwrap(),
            "image/png"
        );
        assert_eq!(canonical_image_mime_type("image/jpg").unwrap(), "image/jpeg");
    }

    #[test]
    fn test_canonical_image_mime_type_rejects() {
        assert!(matches!(
            canonical_image_mime_type("not-a-mime"),
            Err(NormalizeError::InvalidMimeType { .. })
        ));
        assert!(matches!(
            canonical_image_mime_type("video/mp4"),
            Err(NormalizeError::InvalidMimeType { .. })
        ));
        assert!(matches!(
            canonical_image_mime_type("image/svg+xml"),
            Err(NormalizeError::InvalidMimeType { .. })
        ));
        let long = format!("image/{}", "a".repeat(120));
        assert!(matches!(
            canonical_image_mime_type(&long),
            Err(NormalizeError::InvalidMimeType { .. })
        ));
    }

    #[test]
    fn test_detect_mime_type_from_data() {
        assert_eq!(
            detect_mime_type_from_data(&solid_png(4, 4, [1, 2, 3])).unwrap(),
            "image/png"
        );
        assert_eq!(
            detect_mime_type_from_data(&solid_jpeg(4, 4, [1, 2, 3])).unwrap(),
            "image/jpeg"
        );
    }

    #[test]
    fn test_detect_mime_type_rejects_garbage() {
        assert!(matches!(
            detect_mime_type_from_data(&[]),
            Err(NormalizeError::Decode { .. })
        ));
        assert!(matches!(
            detect_mime_type_from_data(b"definitely not an image"),
            Err(NormalizeError::Decode { .. })
        ));
    }

    #[test]
    fn test_validate_image_dimensions() {
        let options = NormalizeOptions::default();
        assert!(validate_image_dimensions(1920, 1080, &options).is_ok());

        let result = validate_image_dimensions(20_000, 100, &options);
        assert!(matches!(
            result,
            Err(NormalizeError::ImageDimensionsTooLarge {
                width: 20_000,
                height: 100,
                ..
            })
        ));

        // Under the side limit but over the pixel budget
        let result = validate_image_dimensions(10_000, 10_000, &options);
        assert!(matches!(
            result,
            Err(NormalizeError::ImageTooManyPixels {
                total_pixels: 100_000_000,
                ..
            })
        ));
    }

    #[test]
    fn test_memory_cap_applies_without_limits() {
        let options = NormalizeOptions::unbounded();
        assert!(validate_image_dimensions(10_000, 5_000, &options).is_ok());
        let result = validate_image_dimensions(20_000, 20_000, &options);
        assert!(matches!(
            result,
            Err(NormalizeError::ImageMemoryTooLarge { max_mb: 256, .. })
        ));
    }
}
