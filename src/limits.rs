//! Resource limits for decoding.
//!
//! [`ResourceLimits`] caps what a decode is allowed to allocate.
//! [`LimitExceeded`] is returned when a check fails. The checks run at
//! increasingly late points of a decode: file size before probing,
//! dimensions after probing, memory once the pixel format is known.

use crate::pixel::PixelFormat;

/// Resource limits for [`Bitmap::decode_with`](crate::Bitmap::decode_with).
///
/// All fields are optional; `None` means no limit for that resource.
///
/// # Example
///
/// ```
/// use rawbitmap::ResourceLimits;
///
/// let limits = ResourceLimits::none()
///     .with_max_pixels(16_000_000)
///     .with_max_memory(64 * 1024 * 1024);
/// assert_eq!(limits.max_pixels, Some(16_000_000));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResourceLimits {
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum pixel storage in bytes.
    pub max_memory_bytes: Option<u64>,
    /// Maximum image width in pixels.
    pub max_width: Option<u32>,
    /// Maximum image height in pixels.
    pub max_height: Option<u32>,
    /// Maximum encoded input size in bytes.
    pub max_file_size: Option<u64>,
}

impl ResourceLimits {
    /// No limits (all fields `None`).
    pub fn none() -> Self {
        Self::default()
    }

    /// Set maximum total pixels.
    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    /// Set maximum pixel storage in bytes.
    pub fn with_max_memory(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Set maximum image width in pixels.
    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Set maximum image height in pixels.
    pub fn with_max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Set maximum encoded input size in bytes.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Check image dimensions against `max_width`, `max_height`, and `max_pixels`.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_width
            && width > max
        {
            return Err(LimitExceeded::Width { actual: width, max });
        }
        if let Some(max) = self.max_height
            && height > max
        {
            return Err(LimitExceeded::Height {
                actual: height,
                max,
            });
        }
        if let Some(max) = self.max_pixels {
            let pixels = width as u64 * height as u64;
            if pixels > max {
                return Err(LimitExceeded::Pixels {
                    actual: pixels,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Check a storage size against `max_memory_bytes`.
    pub fn check_memory(&self, bytes: u64) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_memory_bytes
            && bytes > max
        {
            return Err(LimitExceeded::Memory { actual: bytes, max });
        }
        Ok(())
    }

    /// Check encoded input size against `max_file_size`.
    pub fn check_file_size(&self, bytes: u64) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_file_size
            && bytes > max
        {
            return Err(LimitExceeded::FileSize { actual: bytes, max });
        }
        Ok(())
    }

    /// Check the storage a `width`×`height` bitmap of `format` would need.
    ///
    /// Runs [`check_dimensions`](Self::check_dimensions) first, then
    /// [`check_memory`](Self::check_memory) with the exact byte count.
    pub fn check_bitmap(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<(), LimitExceeded> {
        self.check_dimensions(width, height)?;
        let bytes = (width as u64 * height as u64).saturating_mul(format.bytes_per_pixel() as u64);
        self.check_memory(bytes)
    }
}

/// A resource limit was exceeded.
///
/// Each variant carries the actual value and the limit that was exceeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LimitExceeded {
    /// Image width exceeded `max_width`.
    Width {
        /// Actual width.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Image height exceeded `max_height`.
    Height {
        /// Actual height.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Pixel count exceeded `max_pixels`.
    Pixels {
        /// Actual pixel count.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
    /// Storage exceeded `max_memory_bytes`.
    Memory {
        /// Required bytes.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
    /// Input size exceeded `max_file_size`.
    FileSize {
        /// Actual size in bytes.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
}

impl core::fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Width { actual, max } => write!(f, "width {actual} exceeds limit {max}"),
            Self::Height { actual, max } => write!(f, "height {actual} exceeds limit {max}"),
            Self::Pixels { actual, max } => {
                write!(f, "pixel count {actual} exceeds limit {max}")
            }
            Self::Memory { actual, max } => {
                write!(f, "memory {actual} bytes exceeds limit {max}")
            }
            Self::FileSize { actual, max } => {
                write!(f, "file size {actual} bytes exceeds limit {max}")
            }
        }
    }
}

impl core::error::Error for LimitExceeded {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_limits() {
        let limits = ResourceLimits::none();
        assert!(limits.check_dimensions(u32::MAX, u32::MAX).is_ok());
        assert!(limits.check_memory(u64::MAX).is_ok());
    }

    #[test]
    fn builder_sets_limits() {
        let limits = ResourceLimits::none()
            .with_max_pixels(1_000_000)
            .with_max_memory(512 * 1024 * 1024);
        assert_eq!(limits.max_pixels, Some(1_000_000));
        assert_eq!(limits.max_memory_bytes, Some(512 * 1024 * 1024));
        assert!(limits.max_file_size.is_none());
    }

    #[test]
    fn check_dimensions_pass() {
        let limits = ResourceLimits::none()
            .with_max_width(1920)
            .with_max_height(1080)
            .with_max_pixels(2_073_600);
        assert!(limits.check_dimensions(1920, 1080).is_ok());
        assert!(limits.check_dimensions(100, 100).is_ok());
    }

    #[test]
    fn check_dimensions_width_exceeded() {
        let limits = ResourceLimits::none().with_max_width(1920);
        let err = limits.check_dimensions(1921, 1080).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Width {
                actual: 1921,
                max: 1920
            }
        );
    }

    #[test]
    fn check_dimensions_height_exceeded() {
        let limits = ResourceLimits::none().with_max_height(1080);
        let err = limits.check_dimensions(1920, 1081).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Height {
                actual: 1081,
                max: 1080
            }
        );
    }

    #[test]
    fn check_dimensions_pixels_exceeded() {
        let limits = ResourceLimits::none().with_max_pixels(1_000_000);
        // 1001×1000 = 1,001,000 > 1,000,000
        let err = limits.check_dimensions(1001, 1000).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Pixels {
                actual: 1_001_000,
                max: 1_000_000
            }
        );
    }

    #[test]
    fn check_file_size() {
        let limits = ResourceLimits::none().with_max_file_size(1024);
        assert!(limits.check_file_size(1024).is_ok());
        assert_eq!(
            limits.check_file_size(1025).unwrap_err(),
            LimitExceeded::FileSize {
                actual: 1025,
                max: 1024
            }
        );
    }

    #[test]
    fn check_bitmap_counts_bytes_per_pixel() {
        // 16x16 RGBA = 1024 bytes, RGB = 768 bytes
        let limits = ResourceLimits::none().with_max_memory(800);
        assert!(limits.check_bitmap(16, 16, PixelFormat::Rgb).is_ok());
        assert_eq!(
            limits.check_bitmap(16, 16, PixelFormat::Rgba).unwrap_err(),
            LimitExceeded::Memory {
                actual: 1024,
                max: 800
            }
        );
    }

    #[test]
    fn check_bitmap_checks_dimensions_first() {
        let limits = ResourceLimits::none().with_max_width(8).with_max_memory(1);
        let err = limits.check_bitmap(9, 1, PixelFormat::Grayscale).unwrap_err();
        assert!(matches!(err, LimitExceeded::Width { .. }));
    }

    #[test]
    fn limit_exceeded_display() {
        use alloc::format;
        let err = LimitExceeded::Width {
            actual: 5000,
            max: 4096,
        };
        assert_eq!(format!("{err}"), "width 5000 exceeds limit 4096");

        let err = LimitExceeded::Memory {
            actual: 2048,
            max: 1024,
        };
        assert_eq!(format!("{err}"), "memory 2048 bytes exceeds limit 1024");
    }
}
