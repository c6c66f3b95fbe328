//! EXIF orientation.

/// EXIF orientation tag values (TIFF tag 274).
///
/// Describes how stored pixels map to the displayed image.
/// [`Bitmap::oriented`](crate::Bitmap::oriented) applies it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Orientation {
    /// Stored pixels are already upright.
    #[default]
    Normal = 1,
    /// Mirror left-right.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Mirror top-bottom.
    FlipVertical = 4,
    /// Swap axes (mirror across the main diagonal).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90 = 6,
    /// Mirror across the anti-diagonal.
    Transverse = 7,
    /// Rotate 90 degrees counter-clockwise.
    Rotate270 = 8,
}

impl Orientation {
    /// Create from an EXIF orientation value.
    ///
    /// Returns [`Normal`](Orientation::Normal) for out-of-range values.
    pub fn from_exif(value: u16) -> Self {
        match value {
            2 => Self::FlipHorizontal,
            3 => Self::Rotate180,
            4 => Self::FlipVertical,
            5 => Self::Transpose,
            6 => Self::Rotate90,
            7 => Self::Transverse,
            8 => Self::Rotate270,
            _ => Self::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_exif_valid() {
        assert_eq!(Orientation::from_exif(1), Orientation::Normal);
        assert_eq!(Orientation::from_exif(4), Orientation::FlipVertical);
        assert_eq!(Orientation::from_exif(8), Orientation::Rotate270);
    }

    #[test]
    fn from_exif_out_of_range_is_normal() {
        assert_eq!(Orientation::from_exif(0), Orientation::Normal);
        assert_eq!(Orientation::from_exif(9), Orientation::Normal);
    }

    #[test]
    fn every_exif_value_is_distinct() {
        for a in 1..=8u16 {
            for b in (a + 1)..=8u16 {
                assert_ne!(Orientation::from_exif(a), Orientation::from_exif(b));
            }
        }
    }
}
