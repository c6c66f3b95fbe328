//! Image container detection.

/// Image containers the decoder front end knows how to recognize.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Pnm,
    Tiff,
    WebP,
    Qoi,
}

impl ImageFormat {
    /// Detect format from magic bytes. Returns `None` if unrecognized.
    pub fn detect(data: &[u8]) -> Option<Self> {
        // JPEG: FF D8 FF
        if data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
            return Some(ImageFormat::Jpeg);
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.len() >= 8 && data[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
            return Some(ImageFormat::Png);
        }

        // GIF: "GIF87a" or "GIF89a"
        if data.len() >= 6
            && data[..3] == *b"GIF"
            && data[3] == b'8'
            && (data[4] == b'7' || data[4] == b'9')
            && data[5] == b'a'
        {
            return Some(ImageFormat::Gif);
        }

        // WebP: "RIFF....WEBP"
        if data.len() >= 12 && data[..4] == *b"RIFF" && data[8..12] == *b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        // TIFF: little-endian "II*\0" or big-endian "MM\0*"
        if data.len() >= 4 && (data[..4] == *b"II*\0" || data[..4] == *b"MM\0*") {
            return Some(ImageFormat::Tiff);
        }

        // QOI: "qoif"
        if data.len() >= 4 && data[..4] == *b"qoif" {
            return Some(ImageFormat::Qoi);
        }

        // BMP: "BM"
        if data.len() >= 2 && data[..2] == *b"BM" {
            return Some(ImageFormat::Bmp);
        }

        // PNM family: P1-P7
        if data.len() >= 2 && data[0] == b'P' && matches!(data[1], b'1'..=b'7') {
            return Some(ImageFormat::Pnm);
        }

        None
    }
}

impl core::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Gif => "GIF",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Pnm => "PNM",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::WebP => "WebP",
            ImageFormat::Qoi => "QOI",
        })
    }
}
