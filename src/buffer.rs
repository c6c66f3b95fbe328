//! Owned pixel buffer.
//!
//! [`Bitmap`] stores `width * height` pixels of one [`PixelFormat`] in a
//! single tightly packed `Vec<u8>`, rows top to bottom. Every pixel and
//! rectangle access is bounds-checked up front, so a failed call leaves the
//! buffer untouched.

use alloc::vec::Vec;
use core::fmt;

use imgref::{Img, ImgRef};
use rgb::{ComponentBytes, FromSlice, Gray, Rgb, Rgba};

use crate::error::BitmapError;
use crate::orientation::Orientation;
use crate::pixel::PixelFormat;

// ---------------------------------------------------------------------------
// Bitmap
// ---------------------------------------------------------------------------

/// Owned 8-bit-per-channel pixel buffer.
///
/// Storage is always exactly `width * height * format.bytes_per_pixel()`
/// bytes with no row padding. Cloning copies the storage; two bitmaps never
/// share pixels.
#[derive(PartialEq, Eq, Hash)]
pub struct Bitmap {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl Bitmap {
    /// Allocate a zero-filled bitmap.
    ///
    /// # Errors
    ///
    /// Returns [`BitmapError::Allocation`] if the byte size overflows or the
    /// allocator cannot provide it.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, BitmapError> {
        let len = storage_len(width, height, format)?;
        let data = zeroed(len, width, height, format)?;
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// A 0×0 bitmap with no storage.
    pub fn empty(format: PixelFormat) -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
            format,
        }
    }

    /// Copy row-major pixel bytes into a new bitmap.
    ///
    /// Only the first `width * height * bpp` bytes of `pixels` are used.
    ///
    /// # Errors
    ///
    /// Returns [`BitmapError::InsufficientData`] if `pixels` is too short, or
    /// [`BitmapError::Allocation`] if storage cannot be obtained.
    pub fn from_pixels(
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: &[u8],
    ) -> Result<Self, BitmapError> {
        let len = storage_len(width, height, format)?;
        if pixels.len() < len {
            return Err(BitmapError::InsufficientData {
                expected: len,
                actual: pixels.len(),
            });
        }
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| BitmapError::Allocation {
                width,
                height,
                format,
            })?;
        data.extend_from_slice(&pixels[..len]);
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// Take ownership of an existing `Vec<u8>` without copying.
    ///
    /// Trailing bytes beyond `width * height * bpp` are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`BitmapError::InsufficientData`] if the vec is too small.
    pub fn from_vec(
        mut data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, BitmapError> {
        let len = storage_len(width, height, format)?;
        if data.len() < len {
            return Err(BitmapError::InsufficientData {
                expected: len,
                actual: data.len(),
            });
        }
        data.truncate(len);
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// Consume the bitmap and return its storage.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel layout.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes in one row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.format.row_bytes(self.width)
    }

    /// Total storage size in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Whether the bitmap holds no pixels (either dimension is 0).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All pixel bytes, row-major, top row first.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to all pixel bytes.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    // --- Addressing ---------------------------------------------------------

    /// Byte offset of pixel (`x`, `y`) within [`pixels`](Self::pixels).
    ///
    /// # Errors
    ///
    /// Returns [`BitmapError::OutOfBounds`] unless `x < width` and `y < height`.
    pub fn offset_of(&self, x: u32, y: u32) -> Result<usize, BitmapError> {
        self.check_pixel(x, y)?;
        Ok(self.offset(x, y))
    }

    /// Bytes of the pixel at column `x`, row `y`.
    ///
    /// The slice is `format().bytes_per_pixel()` long.
    pub fn pixel(&self, x: u32, y: u32) -> Result<&[u8], BitmapError> {
        self.check_pixel(x, y)?;
        let start = self.offset(x, y);
        Ok(&self.data[start..start + self.format.bytes_per_pixel()])
    }

    /// Mutable bytes of the pixel at column `x`, row `y`.
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Result<&mut [u8], BitmapError> {
        self.check_pixel(x, y)?;
        let start = self.offset(x, y);
        let bpp = self.format.bytes_per_pixel();
        Ok(&mut self.data[start..start + bpp])
    }

    /// Overwrite the pixel at column `x`, row `y`.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfBounds`] for invalid coordinates,
    /// [`BitmapError::PixelSize`] if `pixel` is not exactly one pixel long.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: &[u8]) -> Result<(), BitmapError> {
        self.check_pixel(x, y)?;
        let bpp = self.format.bytes_per_pixel();
        if pixel.len() != bpp {
            return Err(BitmapError::PixelSize {
                expected: bpp,
                actual: pixel.len(),
            });
        }
        let start = self.offset(x, y);
        self.data[start..start + bpp].copy_from_slice(pixel);
        Ok(())
    }

    /// Bytes of row `y`.
    pub fn row(&self, y: u32) -> Result<&[u8], BitmapError> {
        self.check_rect(0, y, self.width, 1)?;
        let len = self.row_bytes();
        let start = y as usize * len;
        Ok(&self.data[start..start + len])
    }

    /// Mutable bytes of row `y`.
    pub fn row_mut(&mut self, y: u32) -> Result<&mut [u8], BitmapError> {
        self.check_rect(0, y, self.width, 1)?;
        let len = self.row_bytes();
        let start = y as usize * len;
        Ok(&mut self.data[start..start + len])
    }

    // --- Transforms ---------------------------------------------------------

    /// Reverse the row order in place.
    pub fn flip_vertically(&mut self) {
        let len = self.row_bytes();
        let height = self.height as usize;
        if len == 0 {
            return;
        }
        for y in 0..height / 2 {
            let (top, bottom) = self.data.split_at_mut((height - 1 - y) * len);
            top[y * len..(y + 1) * len].swap_with_slice(&mut bottom[..len]);
        }
    }

    /// Mirror every row left to right in place.
    pub fn flip_horizontally(&mut self) {
        let len = self.row_bytes();
        let bpp = self.format.bytes_per_pixel();
        let width = self.width as usize;
        if len == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(len) {
            for x in 0..width / 2 {
                let (left, right) = row.split_at_mut((width - 1 - x) * bpp);
                left[x * bpp..(x + 1) * bpp].swap_with_slice(&mut right[..bpp]);
            }
        }
    }

    /// A copy rotated 90° counter-clockwise.
    ///
    /// The result is `height` wide and `width` tall; its pixel (`x'`, `y'`)
    /// is this bitmap's pixel (`width - 1 - y'`, `x'`).
    ///
    /// # Errors
    ///
    /// Returns [`BitmapError::Allocation`] if the new storage cannot be
    /// obtained.
    pub fn rotated_90_counter_clockwise(&self) -> Result<Bitmap, BitmapError> {
        let bpp = self.format.bytes_per_pixel();
        let width = self.width as usize;
        let height = self.height as usize;
        let mut data = zeroed(self.data.len(), self.height, self.width, self.format)?;
        if !data.is_empty() {
            for (y, row) in self.data.chunks_exact(width * bpp).enumerate() {
                for (x, px) in row.chunks_exact(bpp).enumerate() {
                    let dst = ((width - 1 - x) * height + y) * bpp;
                    data[dst..dst + bpp].copy_from_slice(px);
                }
            }
        }
        Ok(Bitmap {
            data,
            width: self.height,
            height: self.width,
            format: self.format,
        })
    }

    /// Rotate 90° counter-clockwise, swapping width and height.
    ///
    /// Dimensions change, so this allocates new storage and drops the old.
    /// On error `self` is unchanged.
    pub fn rotate_90_counter_clockwise(&mut self) -> Result<(), BitmapError> {
        *self = self.rotated_90_counter_clockwise()?;
        Ok(())
    }

    /// A copy transformed from stored orientation into display orientation.
    ///
    /// # Errors
    ///
    /// Returns [`BitmapError::Allocation`] if the copy cannot be obtained.
    pub fn oriented(&self, orientation: Orientation) -> Result<Bitmap, BitmapError> {
        let out = match orientation {
            Orientation::Normal => self.try_clone()?,
            Orientation::FlipHorizontal => {
                let mut out = self.try_clone()?;
                out.flip_horizontally();
                out
            }
            Orientation::Rotate180 => {
                let mut out = self.try_clone()?;
                out.flip_vertically();
                out.flip_horizontally();
                out
            }
            Orientation::FlipVertical => {
                let mut out = self.try_clone()?;
                out.flip_vertically();
                out
            }
            Orientation::Transpose => {
                let mut out = self.rotated_90_counter_clockwise()?;
                out.flip_vertically();
                out
            }
            Orientation::Rotate90 => {
                let mut out = self.rotated_90_counter_clockwise()?;
                out.flip_vertically();
                out.flip_horizontally();
                out
            }
            Orientation::Transverse => {
                let mut out = self.rotated_90_counter_clockwise()?;
                out.flip_horizontally();
                out
            }
            Orientation::Rotate270 => self.rotated_90_counter_clockwise()?,
        };
        Ok(out)
    }

    // --- Rectangle copy -----------------------------------------------------

    /// Copy a `width`×`height` rectangle from `src` at (`src_x`, `src_y`)
    /// into this bitmap at (`dst_x`, `dst_y`).
    ///
    /// Formats must match. Both rectangles must lie fully inside their
    /// bitmaps. To copy within a single bitmap use
    /// [`copy_rect_within`](Self::copy_rect_within).
    ///
    /// # Errors
    ///
    /// [`BitmapError::FormatMismatch`] or [`BitmapError::OutOfBounds`]; in
    /// both cases nothing is written.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_rect_from(
        &mut self,
        src: &Bitmap,
        src_x: u32,
        src_y: u32,
        dst_x: u32,
        dst_y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), BitmapError> {
        if src.format != self.format {
            return Err(BitmapError::FormatMismatch {
                expected: self.format,
                actual: src.format,
            });
        }
        src.check_rect(src_x, src_y, width, height)?;
        self.check_rect(dst_x, dst_y, width, height)?;

        let run = self.format.row_bytes(width);
        for row in 0..height {
            let from = src.offset(src_x, src_y + row);
            let to = self.offset(dst_x, dst_y + row);
            self.data[to..to + run].copy_from_slice(&src.data[from..from + run]);
        }
        Ok(())
    }

    /// Copy a rectangle to another position in this same bitmap.
    ///
    /// Overlapping rectangles are handled: rows are visited in the order that
    /// never reads an already overwritten row, and each row moves with
    /// memmove semantics.
    pub fn copy_rect_within(
        &mut self,
        src_x: u32,
        src_y: u32,
        dst_x: u32,
        dst_y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), BitmapError> {
        self.check_rect(src_x, src_y, width, height)?;
        self.check_rect(dst_x, dst_y, width, height)?;

        let run = self.format.row_bytes(width);
        for i in 0..height {
            let row = if dst_y <= src_y { i } else { height - 1 - i };
            let from = self.offset(src_x, src_y + row);
            let to = self.offset(dst_x, dst_y + row);
            self.data.copy_within(from..from + run, to);
        }
        Ok(())
    }

    /// Copy a sub-region into a new bitmap.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Bitmap, BitmapError> {
        self.check_rect(x, y, width, height)?;
        let mut out = Bitmap::new(width, height, self.format)?;
        out.copy_rect_from(self, x, y, 0, 0, width, height)?;
        Ok(out)
    }

    // --- Typed views --------------------------------------------------------

    /// Zero-copy typed view of an [`Rgb`](PixelFormat::Rgb) bitmap.
    ///
    /// Returns `None` for other formats and for empty bitmaps.
    pub fn as_rgb8(&self) -> Option<ImgRef<'_, Rgb<u8>>> {
        (self.format == PixelFormat::Rgb && !self.is_empty()).then(|| {
            Img::new(
                self.data.as_rgb(),
                self.width as usize,
                self.height as usize,
            )
        })
    }

    /// Zero-copy typed view of an [`Rgba`](PixelFormat::Rgba) bitmap.
    ///
    /// Returns `None` for other formats and for empty bitmaps.
    pub fn as_rgba8(&self) -> Option<ImgRef<'_, Rgba<u8>>> {
        (self.format == PixelFormat::Rgba && !self.is_empty()).then(|| {
            Img::new(
                self.data.as_rgba(),
                self.width as usize,
                self.height as usize,
            )
        })
    }

    // --- Private helpers ----------------------------------------------------

    /// `clone` that reports allocation failure instead of aborting.
    fn try_clone(&self) -> Result<Bitmap, BitmapError> {
        Bitmap::from_pixels(self.width, self.height, self.format, &self.data)
    }

    /// `(y * width + x) * bpp`, unchecked. Callers validate first.
    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.format.bytes_per_pixel()
    }

    fn check_pixel(&self, x: u32, y: u32) -> Result<(), BitmapError> {
        if x < self.width && y < self.height {
            Ok(())
        } else {
            Err(self.out_of_bounds(x, y, 1, 1))
        }
    }

    fn check_rect(&self, x: u32, y: u32, width: u32, height: u32) -> Result<(), BitmapError> {
        let fits_x = x.checked_add(width).is_some_and(|end| end <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|end| end <= self.height);
        if fits_x && fits_y {
            Ok(())
        } else {
            Err(self.out_of_bounds(x, y, width, height))
        }
    }

    fn out_of_bounds(&self, x: u32, y: u32, width: u32, height: u32) -> BitmapError {
        BitmapError::OutOfBounds {
            x,
            y,
            width,
            height,
            bitmap_width: self.width,
            bitmap_height: self.height,
        }
    }
}

impl Clone for Bitmap {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }

    /// Reuses this bitmap's allocation when it is large enough.
    fn clone_from(&mut self, source: &Self) {
        self.data.clone_from(&source.data);
        self.width = source.width;
        self.height = source.height;
        self.format = source.format;
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmap({}x{}, {:?})", self.width, self.height, self.format)
    }
}

// ---------------------------------------------------------------------------
// ImgRef → Bitmap (TryFrom, always copies)
// ---------------------------------------------------------------------------

macro_rules! impl_from_imgref {
    ($pixel:ty, $format:expr) => {
        impl TryFrom<ImgRef<'_, $pixel>> for Bitmap {
            type Error = BitmapError;

            /// Packs the rows of `img`, dropping any stride padding.
            fn try_from(img: ImgRef<'_, $pixel>) -> Result<Self, BitmapError> {
                let format: PixelFormat = $format;
                let too_large = || BitmapError::Allocation {
                    width: u32::try_from(img.width()).unwrap_or(u32::MAX),
                    height: u32::try_from(img.height()).unwrap_or(u32::MAX),
                    format,
                };
                let width = u32::try_from(img.width()).map_err(|_| too_large())?;
                let height = u32::try_from(img.height()).map_err(|_| too_large())?;
                let len = storage_len(width, height, format)?;
                let mut data = Vec::new();
                data.try_reserve_exact(len).map_err(|_| too_large())?;
                for row in img.rows() {
                    data.extend_from_slice(row.as_bytes());
                }
                Ok(Bitmap {
                    data,
                    width,
                    height,
                    format,
                })
            }
        }
    };
}

impl_from_imgref!(Gray<u8>, PixelFormat::Grayscale);
impl_from_imgref!(Rgb<u8>, PixelFormat::Rgb);
impl_from_imgref!(Rgba<u8>, PixelFormat::Rgba);

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Zero-filled storage of `len` bytes, or `Allocation` if it cannot be reserved.
fn zeroed(
    len: usize,
    width: u32,
    height: u32,
    format: PixelFormat,
) -> Result<Vec<u8>, BitmapError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| BitmapError::Allocation {
            width,
            height,
            format,
        })?;
    data.resize(len, 0);
    Ok(data)
}

fn storage_len(width: u32, height: u32, format: PixelFormat) -> Result<usize, BitmapError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(format.bytes_per_pixel()))
        .ok_or(BitmapError::Allocation {
            width,
            height,
            format,
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
