//! Error types for bitmap construction, addressing and decoding.

use alloc::string::String;
use core::fmt;

use crate::format::ImageFormat;
use crate::limits::LimitExceeded;
use crate::pixel::PixelFormat;

/// Errors from [`Bitmap`](crate::Bitmap) operations.
///
/// Every check runs before the bitmap is touched, so an `Err` never leaves a
/// partially written buffer behind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum BitmapError {
    /// Storage for the requested dimensions could not be obtained, either
    /// because the byte size overflows `usize` or the allocator refused it.
    Allocation {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Requested format.
        format: PixelFormat,
    },
    /// The image container could not be read or decoded.
    Decode(DecodeError),
    /// The decoder produced a channel count outside 1-4.
    UnsupportedChannelCount(u8),
    /// A pixel or rectangle lies (partly) outside the bitmap.
    OutOfBounds {
        /// Left column of the requested region.
        x: u32,
        /// Top row of the requested region.
        y: u32,
        /// Region width (1 for single-pixel access).
        width: u32,
        /// Region height (1 for single-pixel access).
        height: u32,
        /// Width of the bitmap that was addressed.
        bitmap_width: u32,
        /// Height of the bitmap that was addressed.
        bitmap_height: u32,
    },
    /// Source and destination formats differ; no channel conversion is done.
    FormatMismatch {
        /// Format of the receiving bitmap.
        expected: PixelFormat,
        /// Format of the source bitmap.
        actual: PixelFormat,
    },
    /// Caller-supplied pixel data is shorter than the dimensions require.
    InsufficientData {
        /// Bytes required.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
    /// A single-pixel write was given the wrong number of bytes.
    PixelSize {
        /// Bytes per pixel of the bitmap.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
    /// A configured [`ResourceLimits`](crate::ResourceLimits) bound was hit.
    Limit(LimitExceeded),
}

impl fmt::Display for BitmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation {
                width,
                height,
                format,
            } => write!(f, "cannot allocate {width}x{height} {format} bitmap"),
            Self::Decode(err) => write!(f, "decode failed: {err}"),
            Self::UnsupportedChannelCount(n) => {
                write!(f, "unsupported channel count {n} (expected 1-4)")
            }
            Self::OutOfBounds {
                x,
                y,
                width,
                height,
                bitmap_width,
                bitmap_height,
            } => write!(
                f,
                "region {width}x{height} at ({x}, {y}) is outside {bitmap_width}x{bitmap_height} bitmap"
            ),
            Self::FormatMismatch { expected, actual } => {
                write!(f, "format mismatch: expected {expected}, got {actual}")
            }
            Self::InsufficientData { expected, actual } => {
                write!(f, "pixel data too small: need {expected} bytes, got {actual}")
            }
            Self::PixelSize { expected, actual } => {
                write!(f, "pixel must be {expected} bytes, got {actual}")
            }
            Self::Limit(err) => write!(f, "resource limit exceeded: {err}"),
        }
    }
}

impl core::error::Error for BitmapError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::Limit(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DecodeError> for BitmapError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

impl From<LimitExceeded> for BitmapError {
    fn from(err: LimitExceeded) -> Self {
        Self::Limit(err)
    }
}

/// Why an encoded image could not be turned into pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// The file could not be read.
    Unreadable(String),
    /// No known container signature at the start of the data.
    UnrecognizedContainer,
    /// The container was recognized but no decoder for it is available.
    UnsupportedContainer(ImageFormat),
    /// The decoder rejected the data.
    Malformed(String),
    /// The decoder returned fewer pixel bytes than its dimensions imply.
    Truncated {
        /// Bytes implied by width, height and channel count.
        expected: usize,
        /// Bytes returned.
        actual: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable(msg) => write!(f, "cannot read image: {msg}"),
            Self::UnrecognizedContainer => f.write_str("unrecognized image container"),
            Self::UnsupportedContainer(format) => {
                write!(f, "no decoder available for {format}")
            }
            Self::Malformed(msg) => write!(f, "malformed image: {msg}"),
            Self::Truncated { expected, actual } => write!(
                f,
                "decoded pixel data truncated: expected {expected} bytes, got {actual}"
            ),
        }
    }
}

impl core::error::Error for DecodeError {}
