//! Owned, format-aware 8-bit pixel buffers.
//!
//! This crate provides [`Bitmap`], a tightly packed row-major grid of
//! pixels in one of four channel layouts:
//!
//! - [`PixelFormat`] — grayscale, grayscale+alpha, RGB, RGBA (1-4 bytes per pixel)
//! - [`Bitmap`] — bounds-checked pixel access, vertical/horizontal flip,
//!   90° rotation, [`Orientation`] handling and rectangle copies
//! - [`Decode`] / [`DecodedImage`] — the seam to an external image decoder
//! - [`ResourceLimits`] — caps on what a decode may allocate
//! - [`ImageFormat`] — container detection from magic bytes
//!
//! With the default `decode` feature, [`ImageRsDecoder`] and
//! [`Bitmap::from_file`] decode common containers through the `image` crate.
//! [`Bitmap::from_file_oriented`] also applies the file's EXIF orientation.
//!
//! ```
//! use rawbitmap::{Bitmap, PixelFormat};
//!
//! let mut bmp = Bitmap::new(4, 2, PixelFormat::Rgba)?;
//! bmp.set_pixel(1, 0, &[255, 0, 0, 255])?;
//! bmp.flip_vertically();
//! assert_eq!(bmp.pixel(1, 1)?, &[255, 0, 0, 255]);
//! # Ok::<(), rawbitmap::BitmapError>(())
//! ```

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(feature = "decode")]
extern crate std;

mod buffer;
mod decode;
mod error;
mod format;
mod limits;
mod orientation;
mod pixel;

pub use buffer::Bitmap;
pub use decode::{Decode, DecodedImage};
#[cfg(feature = "decode")]
pub use decode::ImageRsDecoder;
pub use error::{BitmapError, DecodeError};
pub use format::ImageFormat;
pub use limits::{LimitExceeded, ResourceLimits};
pub use orientation::Orientation;
pub use pixel::PixelFormat;

// Re-exports for typed pixel access.
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb;
pub use rgb::{Gray, Rgb, Rgba};
