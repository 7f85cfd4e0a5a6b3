//! Image format detection for image streams and thumbnails.

/// Image encodings the LRF container can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Bmp,
    Gif,
}

impl ImageKind {
    /// Container type code for this encoding.
    pub fn code(self) -> u16 {
        match self {
            ImageKind::Jpeg => 0x11,
            ImageKind::Png => 0x12,
            ImageKind::Bmp => 0x13,
            ImageKind::Gif => 0x14,
        }
    }
}

/// Detect an image encoding from file path and/or raw bytes.
///
/// Tries extension-based detection first (the common case), then falls
/// back to magic bytes.
pub fn detect_image_kind(path: &str, data: &[u8]) -> Option<ImageKind> {
    let path_lower = path.to_lowercase();

    if path_lower.ends_with(".jpg") || path_lower.ends_with(".jpeg") {
        return Some(ImageKind::Jpeg);
    }
    if path_lower.ends_with(".png") {
        return Some(ImageKind::Png);
    }
    if path_lower.ends_with(".bmp") {
        return Some(ImageKind::Bmp);
    }
    if path_lower.ends_with(".gif") {
        return Some(ImageKind::Gif);
    }

    if data.len() >= 4 {
        // JPEG: FF D8
        if data[0] == 0xFF && data[1] == 0xD8 {
            return Some(ImageKind::Jpeg);
        }
        // PNG: 89 50 4E 47 (.PNG)
        if data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47 {
            return Some(ImageKind::Png);
        }
        // GIF: 47 49 46 (GIF)
        if data[0] == 0x47 && data[1] == 0x49 && data[2] == 0x46 {
            return Some(ImageKind::Gif);
        }
        // BMP: 42 4D (BM)
        if data[0] == 0x42 && data[1] == 0x4D {
            return Some(ImageKind::Bmp);
        }
    }

    None
}
