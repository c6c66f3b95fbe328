//! Pixel channel layouts.

/// Channel layout of an 8-bit-per-channel bitmap.
///
/// The discriminant is the channel count, which is also the number of bytes
/// one pixel occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PixelFormat {
    /// Single luminance channel.
    Grayscale = 1,
    /// Luminance + alpha.
    GrayscaleAlpha = 2,
    /// Red, green, blue.
    Rgb = 3,
    /// Red, green, blue, alpha.
    Rgba = 4,
}

impl PixelFormat {
    /// Map a decoded channel count to a format.
    ///
    /// Returns `None` for anything outside 1-4.
    #[inline]
    pub const fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(Self::Grayscale),
            2 => Some(Self::GrayscaleAlpha),
            3 => Some(Self::Rgb),
            4 => Some(Self::Rgba),
            _ => None,
        }
    }

    /// Number of channels.
    #[inline]
    pub const fn channels(self) -> u8 {
        self as u8
    }

    /// Byte stride of one pixel.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self as usize
    }

    /// Whether the layout carries an alpha channel.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::GrayscaleAlpha | Self::Rgba)
    }

    /// Bytes in one tightly packed row of `width` pixels.
    #[inline]
    pub const fn row_bytes(self, width: u32) -> usize {
        width as usize * self.bytes_per_pixel()
    }
}

impl core::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Grayscale => "grayscale",
            Self::GrayscaleAlpha => "grayscale+alpha",
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
        })
    }
}
