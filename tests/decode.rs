#![cfg(feature = "decode")]

use std::io::Cursor;
use std::path::PathBuf;

use rawbitmap::{
    Bitmap, BitmapError, DecodeError, ImageRsDecoder, LimitExceeded, Orientation, PixelFormat,
    ResourceLimits,
};

/// Write `image` as PNG into a per-process temp file and return its path.
fn write_png(name: &str, image: image::DynamicImage) -> PathBuf {
    let path = std::env::temp_dir().join(format!("rawbitmap-{}-{name}.png", std::process::id()));
    image
        .save_with_format(&path, image::ImageFormat::Png)
        .expect("write fixture");
    path
}

fn encode(image: image::DynamicImage, format: image::ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode fixture");
    bytes
}

fn png_bytes(image: image::DynamicImage) -> Vec<u8> {
    encode(image, image::ImageFormat::Png)
}

/// 4x2 RGB JPEG carrying an APP1 EXIF segment with the given orientation.
fn jpeg_with_orientation(orientation: u8) -> Vec<u8> {
    let raw: Vec<u8> = (0..4 * 2 * 3).map(|i| (i * 10) as u8).collect();
    let img = image::RgbImage::from_raw(4, 2, raw).unwrap();
    let jpeg = encode(img.into(), image::ImageFormat::Jpeg);

    #[rustfmt::skip]
    let app1 = [
        0xFF, 0xE1, 0x00, 0x22,
        b'E', b'x', b'i', b'f', 0x00, 0x00,
        // Big-endian TIFF header, first IFD at offset 8.
        b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08,
        // One entry: tag 0x0112 (Orientation), SHORT, count 1.
        0x00, 0x01,
        0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, 0x00, orientation, 0x00, 0x00,
        // No next IFD.
        0x00, 0x00, 0x00, 0x00,
    ];
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}

#[test]
fn rgb_png_from_file() {
    let raw = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 0];
    let img = image::RgbImage::from_raw(2, 2, raw.clone()).unwrap();
    let path = write_png("rgb", img.into());

    let bmp = Bitmap::from_file(&path).unwrap();
    assert_eq!(bmp.format(), PixelFormat::Rgb);
    assert_eq!((bmp.width(), bmp.height()), (2, 2));
    assert_eq!(bmp.pixels(), raw.as_slice());
    std::fs::remove_file(path).ok();
}

#[test]
fn texture_style_load_then_flip() {
    let raw = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 0];
    let img = image::RgbImage::from_raw(2, 2, raw).unwrap();
    let path = write_png("flip", img.into());

    let mut bmp = Bitmap::from_file(&path).unwrap();
    bmp.flip_vertically();
    assert_eq!(
        bmp.pixels(),
        &[0, 0, 255, 255, 255, 0, 255, 0, 0, 0, 255, 0]
    );
    std::fs::remove_file(path).ok();
}

#[test]
fn channel_counts_map_to_formats() {
    let gray = image::GrayImage::from_raw(2, 1, vec![1, 2]).unwrap();
    let bmp = Bitmap::from_memory(&png_bytes(gray.into())).unwrap();
    assert_eq!(bmp.format(), PixelFormat::Grayscale);
    assert_eq!(bmp.pixels(), &[1, 2]);

    let gray_alpha = image::GrayAlphaImage::from_raw(1, 1, vec![7, 128]).unwrap();
    let bmp = Bitmap::from_memory(&png_bytes(gray_alpha.into())).unwrap();
    assert_eq!(bmp.format(), PixelFormat::GrayscaleAlpha);
    assert_eq!(bmp.pixels(), &[7, 128]);

    let rgba = image::RgbaImage::from_raw(1, 1, vec![1, 2, 3, 4]).unwrap();
    let bmp = Bitmap::from_memory(&png_bytes(rgba.into())).unwrap();
    assert_eq!(bmp.format(), PixelFormat::Rgba);
    assert_eq!(bmp.pixels(), &[1, 2, 3, 4]);
}

#[test]
fn sixteen_bit_png_is_narrowed() {
    let img: image::ImageBuffer<image::Rgb<u16>, Vec<u16>> =
        image::ImageBuffer::from_raw(1, 1, vec![0xFFFF, 0, 0x8080]).unwrap();
    let bmp = Bitmap::from_memory(&png_bytes(image::DynamicImage::ImageRgb16(img))).unwrap();
    assert_eq!(bmp.format(), PixelFormat::Rgb);
    assert_eq!(bmp.pixels(), &[255, 0, 128]);
}

#[test]
fn missing_file_is_unreadable() {
    let path = std::env::temp_dir().join("rawbitmap-does-not-exist.png");
    let err = Bitmap::from_file(&path).unwrap_err();
    assert!(matches!(err, BitmapError::Decode(DecodeError::Unreadable(_))));
}

#[test]
fn non_image_file_is_unrecognized() {
    let path = std::env::temp_dir().join(format!("rawbitmap-{}-text.png", std::process::id()));
    std::fs::write(&path, b"just some text").unwrap();
    let err = Bitmap::from_file(&path).unwrap_err();
    assert_eq!(err, BitmapError::Decode(DecodeError::UnrecognizedContainer));
    std::fs::remove_file(path).ok();
}

#[test]
fn limits_apply_to_files() {
    let img = image::RgbaImage::from_raw(8, 8, vec![0; 256]).unwrap();
    let path = write_png("limits", img.into());

    let limits = ResourceLimits::none().with_max_file_size(1);
    let err = Bitmap::from_file_with_limits(&path, &limits).unwrap_err();
    assert!(matches!(err, BitmapError::Limit(LimitExceeded::FileSize { max: 1, .. })));

    let limits = ResourceLimits::none().with_max_width(4);
    let err = Bitmap::from_file_with_limits(&path, &limits).unwrap_err();
    assert_eq!(
        err,
        BitmapError::Limit(LimitExceeded::Width { actual: 8, max: 4 })
    );

    let limits = ResourceLimits::none().with_max_memory(255);
    let err = Bitmap::from_file_with_limits(&path, &limits).unwrap_err();
    assert!(matches!(err, BitmapError::Limit(LimitExceeded::Memory { actual: 256, .. })));

    let limits = ResourceLimits::none().with_max_memory(256).with_max_pixels(64);
    assert!(Bitmap::from_file_with_limits(&path, &limits).is_ok());
    std::fs::remove_file(path).ok();
}

#[test]
fn exif_orientation_is_reported() {
    let data = jpeg_with_orientation(6);

    let stored = Bitmap::from_memory(&data).unwrap();
    assert_eq!((stored.width(), stored.height()), (4, 2));

    let (bmp, orientation) =
        Bitmap::decode_with_orientation(&ImageRsDecoder, &data, &ResourceLimits::none()).unwrap();
    assert_eq!(orientation, Orientation::Rotate90);
    assert_eq!(bmp, stored);
}

#[test]
fn exif_orientation_is_applied() {
    let data = jpeg_with_orientation(6);
    let stored = Bitmap::from_memory(&data).unwrap();

    let upright = Bitmap::from_memory_oriented(&data).unwrap();
    assert_eq!((upright.width(), upright.height()), (2, 4));
    assert_eq!(upright, stored.oriented(Orientation::Rotate90).unwrap());

    let path = std::env::temp_dir().join(format!("rawbitmap-{}-exif.jpg", std::process::id()));
    std::fs::write(&path, &data).unwrap();
    assert_eq!(Bitmap::from_file_oriented(&path).unwrap(), upright);
    std::fs::remove_file(path).ok();
}

#[test]
fn untagged_file_is_unchanged_when_oriented() {
    let raw = vec![1, 2, 3, 4, 5, 6];
    let img = image::GrayImage::from_raw(3, 2, raw.clone()).unwrap();
    let path = write_png("untagged", img.into());

    let bmp = Bitmap::from_file_oriented(&path).unwrap();
    assert_eq!((bmp.width(), bmp.height()), (3, 2));
    assert_eq!(bmp.pixels(), raw.as_slice());
    std::fs::remove_file(path).ok();
}
