//! Encoded test images built in memory

use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

fn encode(img: impl Into<DynamicImage>, format: ImageFormat) -> Vec<u8> {
    let mut data = Vec::new();
    img.into()
        .write_to(&mut Cursor::new(&mut data), format)
        .expect("encode test image");
    data
}

/// Single-color PNG
pub fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    encode(RgbImage::from_pixel(width, height, Rgb(color)), ImageFormat::Png)
}

/// Single-color JPEG
pub fn solid_jpeg(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    encode(RgbImage::from_pixel(width, height, Rgb(color)), ImageFormat::Jpeg)
}

/// Insert an EXIF APP1 segment carrying `orientation` right after the SOI
/// marker of `jpeg`
pub fn with_exif_orientation(jpeg: Vec<u8>, orientation: u16) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");

    let field = Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![orientation]),
    };
    let mut writer = Writer::new();
    writer.push_field(&field);
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).expect("write exif");
    let tiff = tiff.into_inner();

    let segment_len = u16::try_from(2 + 6 + tiff.len()).expect("exif segment too large");
    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Single-color PNG with an alpha channel
pub fn rgba_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    encode(RgbaImage::from_pixel(width, height, Rgba(color)), ImageFormat::Png)
}

/// PNG split into three equal-width columns, left to right
pub fn vertical_bands_png(width: u32, height: u32, colors: [[u8; 3]; 3]) -> Vec<u8> {
    let band = (width / 3).max(1);
    let img = RgbImage::from_fn(width, height, |x, _| {
        Rgb(colors[((x / band) as usize).min(2)])
    });
    encode(img, ImageFormat::Png)
}

/// PNG split into three equal-height rows, top to bottom
pub fn horizontal_bands_png(width: u32, height: u32, colors: [[u8; 3]; 3]) -> Vec<u8> {
    let band = (height / 3).max(1);
    let img = RgbImage::from_fn(width, height, |_, y| {
        Rgb(colors[((y / band) as usize).min(2)])
    });
    encode(img, ImageFormat::Png)
}

/// PNG with a diagonal color gradient, useful where JPEG size must vary with quality
pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    });
    encode(img, ImageFormat::Png)
}
