//! Turning encoded images into bitmaps.
//!
//! The container work is delegated to a [`Decode`] implementation; this
//! module only maps its output onto a [`Bitmap`] and enforces
//! [`ResourceLimits`] at each stage. With the `decode` feature,
//! [`ImageRsDecoder`] provides an implementation backed by the `image` crate.

use alloc::vec::Vec;

use crate::buffer::Bitmap;
use crate::error::{BitmapError, DecodeError};
use crate::limits::ResourceLimits;
use crate::orientation::Orientation;
use crate::pixel::PixelFormat;

/// Raw output of a decoder: row-major 8-bit samples plus a channel count.
///
/// Pixels are in stored order. `orientation` says how to display them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Samples per pixel. Only 1-4 map to a [`PixelFormat`].
    pub channels: u8,
    /// `width * height * channels` bytes, no row padding.
    pub pixels: Vec<u8>,
    /// Orientation tag found in the file, `Normal` if there was none.
    pub orientation: Orientation,
}

/// An image decoder.
///
/// Implementations turn a complete encoded file into [`DecodedImage`].
/// [`dimensions`](Decode::dimensions) should be cheap: it runs before
/// [`decode`](Decode::decode) so oversized images can be rejected without
/// decoding any pixels.
pub trait Decode {
    /// The decoder's error type.
    type Error: core::error::Error + Into<DecodeError>;

    /// Read width and height from the header.
    fn dimensions(&self, data: &[u8]) -> Result<(u32, u32), Self::Error>;

    /// Decode all pixels.
    fn decode(&self, data: &[u8]) -> Result<DecodedImage, Self::Error>;
}

impl Bitmap {
    /// Wrap decoder output, choosing the format from the channel count.
    ///
    /// # Errors
    ///
    /// [`BitmapError::UnsupportedChannelCount`] outside 1-4,
    /// [`DecodeError::Truncated`] if the decoder returned too few bytes.
    pub fn from_decoded(image: DecodedImage) -> Result<Self, BitmapError> {
        let format = PixelFormat::from_channels(image.channels)
            .ok_or(BitmapError::UnsupportedChannelCount(image.channels))?;
        Bitmap::from_vec(image.pixels, image.width, image.height, format).map_err(|err| match err {
            BitmapError::InsufficientData { expected, actual } => {
                BitmapError::Decode(DecodeError::Truncated { expected, actual })
            }
            other => other,
        })
    }

    /// Decode `data` with `decoder`, enforcing `limits`.
    ///
    /// File size is checked first, then the probed dimensions, then the
    /// storage the decoded format needs. Nothing is returned on failure.
    /// Pixels stay in stored order; see
    /// [`decode_with_orientation`](Self::decode_with_orientation).
    pub fn decode_with<D: Decode>(
        decoder: &D,
        data: &[u8],
        limits: &ResourceLimits,
    ) -> Result<Self, BitmapError> {
        Self::decode_with_orientation(decoder, data, limits).map(|(bitmap, _)| bitmap)
    }

    /// Like [`decode_with`](Self::decode_with), also returning the file's
    /// orientation tag. Apply it with [`Bitmap::oriented`].
    pub fn decode_with_orientation<D: Decode>(
        decoder: &D,
        data: &[u8],
        limits: &ResourceLimits,
    ) -> Result<(Self, Orientation), BitmapError> {
        limits.check_file_size(data.len() as u64)?;

        let (width, height) = decoder
            .dimensions(data)
            .map_err(|err| BitmapError::Decode(err.into()))?;
        limits.check_dimensions(width, height)?;

        let image = decoder
            .decode(data)
            .map_err(|err| BitmapError::Decode(err.into()))?;
        log::trace!(
            "decoded {}x{} image with {} channels, {:?}",
            image.width,
            image.height,
            image.channels,
            image.orientation
        );

        let format = PixelFormat::from_channels(image.channels)
            .ok_or(BitmapError::UnsupportedChannelCount(image.channels))?;
        limits.check_bitmap(image.width, image.height, format)?;
        let orientation = image.orientation;
        Ok((Self::from_decoded(image)?, orientation))
    }
}

#[cfg(feature = "decode")]
pub use self::image_rs::ImageRsDecoder;

#[cfg(feature = "decode")]
mod image_rs {
    use alloc::format;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use std::io::Cursor;
    use std::path::Path;

    use image::error::UnsupportedErrorKind;
    use image::{DynamicImage, ImageDecoder, ImageError, ImageReader};

    use super::{Decode, DecodedImage};
    use crate::buffer::Bitmap;
    use crate::error::{BitmapError, DecodeError};
    use crate::format::ImageFormat;
    use crate::limits::ResourceLimits;
    use crate::orientation::Orientation;

    /// [`Decode`] implementation backed by the `image` crate.
    ///
    /// The container is chosen from the magic bytes, never from a file
    /// extension. 16-bit and float images are narrowed to 8 bits per channel;
    /// the channel count is kept. The EXIF orientation tag, where the
    /// container carries one, is reported in [`DecodedImage::orientation`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct ImageRsDecoder;

    impl ImageRsDecoder {
        fn reader(data: &[u8]) -> Result<(ImageFormat, ImageReader<Cursor<&[u8]>>), DecodeError> {
            let format = ImageFormat::detect(data).ok_or(DecodeError::UnrecognizedContainer)?;
            let mut reader = ImageReader::new(Cursor::new(data));
            reader.set_format(to_image_format(format));
            // ResourceLimits are enforced by the caller.
            reader.no_limits();
            Ok((format, reader))
        }
    }

    impl Decode for ImageRsDecoder {
        type Error = DecodeError;

        fn dimensions(&self, data: &[u8]) -> Result<(u32, u32), DecodeError> {
            let (format, reader) = Self::reader(data)?;
            reader
                .into_dimensions()
                .map_err(|err| map_image_error(format, err))
        }

        fn decode(&self, data: &[u8]) -> Result<DecodedImage, DecodeError> {
            let (format, reader) = Self::reader(data)?;
            log::trace!("decoding {} bytes as {format}", data.len());
            let mut decoder = reader
                .into_decoder()
                .map_err(|err| map_image_error(format, err))?;
            let orientation = decoder
                .orientation()
                .map_err(|err| map_image_error(format, err))?;
            let image =
                DynamicImage::from_decoder(decoder).map_err(|err| map_image_error(format, err))?;
            Ok(into_decoded(image, to_orientation(orientation)))
        }
    }

    impl Bitmap {
        /// Decode an in-memory image file.
        pub fn from_memory(data: &[u8]) -> Result<Self, BitmapError> {
            Self::decode_with(&ImageRsDecoder, data, &ResourceLimits::none())
        }

        /// Decode an in-memory image file and apply its orientation tag.
        pub fn from_memory_oriented(data: &[u8]) -> Result<Self, BitmapError> {
            let (bitmap, orientation) =
                Self::decode_with_orientation(&ImageRsDecoder, data, &ResourceLimits::none())?;
            upright(bitmap, orientation)
        }

        /// Read and decode an image file.
        ///
        /// Blocks on file I/O; there is no timeout.
        pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BitmapError> {
            Self::from_file_with_limits(path, &ResourceLimits::none())
        }

        /// Read and decode an image file, enforcing `limits`.
        ///
        /// With `max_file_size` set, the size on disk is checked before the
        /// file is read.
        pub fn from_file_with_limits(
            path: impl AsRef<Path>,
            limits: &ResourceLimits,
        ) -> Result<Self, BitmapError> {
            let path = path.as_ref();
            let data = read_file(path, limits)?;
            let bitmap = Self::decode_with(&ImageRsDecoder, &data, limits)?;
            log::debug!(
                "loaded {path:?}: {}x{} {}",
                bitmap.width(),
                bitmap.height(),
                bitmap.format()
            );
            Ok(bitmap)
        }

        /// Read and decode an image file, then apply its orientation tag so
        /// the result is upright.
        pub fn from_file_oriented(path: impl AsRef<Path>) -> Result<Self, BitmapError> {
            let path = path.as_ref();
            let limits = ResourceLimits::none();
            let data = read_file(path, &limits)?;
            let (bitmap, orientation) =
                Self::decode_with_orientation(&ImageRsDecoder, &data, &limits)?;
            log::debug!(
                "loaded {path:?}: {}x{} {}, {orientation:?}",
                bitmap.width(),
                bitmap.height(),
                bitmap.format()
            );
            upright(bitmap, orientation)
        }
    }

    /// Read a whole file, checking `max_file_size` against the size on disk
    /// first.
    fn read_file(path: &Path, limits: &ResourceLimits) -> Result<Vec<u8>, BitmapError> {
        log::trace!("loading bitmap from {path:?}");
        let unreadable =
            |err: std::io::Error| DecodeError::Unreadable(format!("{}: {err}", path.display()));

        if limits.max_file_size.is_some() {
            let len = std::fs::metadata(path).map_err(unreadable)?.len();
            limits.check_file_size(len)?;
        }
        Ok(std::fs::read(path).map_err(unreadable)?)
    }

    fn upright(bitmap: Bitmap, orientation: Orientation) -> Result<Bitmap, BitmapError> {
        if orientation == Orientation::Normal {
            Ok(bitmap)
        } else {
            bitmap.oriented(orientation)
        }
    }

    fn to_orientation(orientation: image::metadata::Orientation) -> Orientation {
        Orientation::from_exif(u16::from(orientation.to_exif()))
    }

    fn into_decoded(image: DynamicImage, orientation: Orientation) -> DecodedImage {
        let color = image.color();
        let channels = color.channel_count();
        let (width, height) = (image.width(), image.height());
        if color.bytes_per_pixel() != channels {
            log::debug!("narrowing {color:?} to 8 bits per channel");
        }
        let pixels = match channels {
            1 => image.into_luma8().into_raw(),
            2 => image.into_luma_alpha8().into_raw(),
            3 => image.into_rgb8().into_raw(),
            4 => image.into_rgba8().into_raw(),
            // Left for Bitmap::from_decoded to reject.
            _ => image.into_bytes(),
        };
        DecodedImage {
            width,
            height,
            channels,
            pixels,
            orientation,
        }
    }

    fn to_image_format(format: ImageFormat) -> image::ImageFormat {
        match format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Pnm => image::ImageFormat::Pnm,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
            ImageFormat::WebP => image::ImageFormat::WebP,
            ImageFormat::Qoi => image::ImageFormat::Qoi,
        }
    }

    fn map_image_error(format: ImageFormat, err: ImageError) -> DecodeError {
        match err {
            ImageError::IoError(err) => DecodeError::Unreadable(err.to_string()),
            ImageError::Unsupported(ref unsupported)
                if matches!(unsupported.kind(), UnsupportedErrorKind::Format(_)) =>
            {
                DecodeError::UnsupportedContainer(format)
            }
            other => DecodeError::Malformed(other.to_string()),
        }
    }
}
