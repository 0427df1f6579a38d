//! Square image normalization
//!
//! Turns arbitrary user artwork into the square JPEG a badge is minted with:
//! decode, apply EXIF orientation, take the centered `min(W, H)` square and
//! re-encode as JPEG. Every call owns its buffers, so calls never race on a
//! shared surface.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageReader, Rgb, RgbImage, Rgba};

use crate::orientation::{apply_orientation, oriented_dimensions, read_exif_orientation};
use crate::types::{
    CropRegion, ImageInfo, NORMALIZED_MIME_TYPE, NormalizeError, NormalizeOptions,
    NormalizedImage, SourceImage,
};
use crate::validation::{
    canonical_image_mime_type, detect_mime_type_from_data, validate_file_size,
    validate_image_dimensions,
};

/// Centered square crop for a `width` x `height` image
///
/// The side is the shorter dimension; the origin splits the leftover space
/// evenly, truncating when it is odd.
pub fn square_crop_region(width: u32, height: u32) -> CropRegion {
    let side = width.min(height);
    CropRegion {
        x: (width - side) / 2,
        y: (height - side) / 2,
        side,
    }
}

/// Crop `source` to a centered square and re-encode it as JPEG
///
/// # Errors
/// * `FileTooLarge` / `InvalidMimeType` - input rejected before decoding
/// * `Decode` - the bytes are not a decodable image (including zero-byte input)
/// * `ImageDimensionsTooLarge` / `ImageTooManyPixels` / `ImageMemoryTooLarge` - header
///   dimensions exceed the configured limits
/// * `Encode` - the JPEG encoder failed or produced no data
pub fn normalize_to_square(
    source: &SourceImage,
    options: &NormalizeOptions,
) -> Result<NormalizedImage, NormalizeError> {
    let detected = preflight(source, options)?;

    let mut img = ImageReader::new(Cursor::new(source.data.as_slice()))
        .with_guessed_format()
        .map_err(|e| NormalizeError::Decode {
            reason: format!("could not read image: {e}"),
        })?
        .decode()
        .map_err(|e| NormalizeError::Decode {
            reason: e.to_string(),
        })?;

    if options.apply_exif_orientation
        && let Some(orientation) = read_exif_orientation(&source.data)
    {
        tracing::debug!(orientation, "applying EXIF orientation");
        img = apply_orientation(img, orientation);
    }

    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(NormalizeError::Decode {
            reason: format!("image has no pixels ({width}x{height})"),
        });
    }

    let crop = square_crop_region(width, height);
    let square = img.crop_imm(crop.x, crop.y, crop.side, crop.side);
    let data = encode_jpeg(&flatten_onto_black(&square), options.jpeg_quality)?;

    tracing::debug!(
        filename = %source.filename,
        source_type = detected,
        width,
        height,
        side = crop.side,
        x = crop.x,
        y = crop.y,
        bytes = data.len(),
        "normalized image to square"
    );

    Ok(NormalizedImage {
        data,
        filename: source.filename.clone(),
        side: crop.side,
        crop,
        source_dimensions: (width, height),
    })
}

/// Header-only inspection: detected type, dimensions and the crop that
/// [`normalize_to_square`] would apply
///
/// Runs the same validation as normalization but never decodes pixel data.
pub fn inspect(source: &SourceImage, options: &NormalizeOptions) -> Result<ImageInfo, NormalizeError> {
    let detected = preflight(source, options)?;
    let dimensions = read_dimensions(&source.data)?;

    let orientation = if options.apply_exif_orientation {
        read_exif_orientation(&source.data)
    } else {
        None
    };
    let (width, height) = oriented_dimensions(dimensions.0, dimensions.1, orientation);

    Ok(ImageInfo {
        detected_mime_type: detected.to_string(),
        dimensions,
        orientation,
        crop: square_crop_region(width, height),
    })
}

/// Checks shared by [`normalize_to_square`] and [`inspect`]
///
/// Returns the MIME type detected from the data.
fn preflight(source: &SourceImage, options: &NormalizeOptions) -> Result<&'static str, NormalizeError> {
    validate_file_size(&source.data, options)?;
    let declared = canonical_image_mime_type(&source.mime_type)?;
    let detected = detect_mime_type_from_data(&source.data)?;
    if declared != detected {
        // Browsers decode by content too; the declared type is only a hint.
        tracing::warn!(
            filename = %source.filename,
            declared = %declared,
            detected,
            "declared media type does not match image data"
        );
    }

    let (width, height) = read_dimensions(&source.data)?;
    validate_image_dimensions(width, height, options)?;
    Ok(detected)
}

fn read_dimensions(data: &[u8]) -> Result<(u32, u32), NormalizeError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| NormalizeError::Decode {
            reason: format!("could not read image header: {e}"),
        })?
        .into_dimensions()
        .map_err(|e| NormalizeError::Decode {
            reason: format!("could not read image dimensions: {e}"),
        })
}

/// Drop the alpha channel the way a canvas JPEG export does: composite onto black
fn flatten_onto_black(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let scale = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
        Rgb([scale(r), scale(g), scale(b)])
    })
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>, NormalizeError> {
    let mut output = Cursor::new(Vec::new());
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));
        encoder
            .encode(
                img.as_raw(),
                img.width(),
                img.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| NormalizeError::Encode {
                reason: e.to_string(),
            })?;
    }

    let data = output.into_inner();
    if data.is_empty() {
        return Err(NormalizeError::Encode {
            reason: format!("{NORMALIZED_MIME_TYPE} encoder produced no data"),
        });
    }
    Ok(data)
}
