//! EXIF orientation handling
//!
//! Phone cameras store pixels in sensor order and record the display rotation
//! in the EXIF `Orientation` tag. Browsers honour the tag when drawing an image,
//! so the square crop must be taken from the rotated image.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;

/// Read the EXIF orientation tag, if any
///
/// Missing or unreadable EXIF data is not an error; it yields `None`.
pub(crate) fn read_exif_orientation(data: &[u8]) -> Option<u32> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(data))
        .ok()?;
    exif.get_field(Tag::Orientation, In::PRIMARY)?
        .value
        .get_uint(0)
}

/// Apply an EXIF orientation value to a decoded image
///
/// EXIF Orientation values:
/// 1 = Normal
/// 2 = Flip horizontal
/// 3 = Rotate 180°
/// 4 = Flip vertical
/// 5 = Transpose (Rotate 90° CW + Flip horizontal)
/// 6 = Rotate 90° CW
/// 7 = Transverse (Rotate 270° CW + Flip horizontal)
/// 8 = Rotate 270° CW
pub(crate) fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Dimensions after an orientation is applied
pub(crate) fn oriented_dimensions(width: u32, height: u32, orientation: Option<u32>) -> (u32, u32) {
    match orientation {
        Some(5..=8) => (height, width),
        _ => (width, height),
    }
}
