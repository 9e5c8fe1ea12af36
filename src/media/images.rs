//! Image format detection for downloaded media.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
            ImageFormat::Gif => "gif",
        }
    }

    /// Recognises the declared `content-type`; parameters such as
    /// `charset` are ignored.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("image/jpeg") || content_type.contains("image/jpg") {
            Some(ImageFormat::Jpeg)
        } else if content_type.contains("image/png") {
            Some(ImageFormat::Png)
        } else if content_type.contains("image/webp") {
            Some(ImageFormat::Webp)
        } else if content_type.contains("image/gif") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }

    /// Recognises the leading magic bytes of the file.
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"\x89PNG") {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(b"RIFF") && bytes[..bytes.len().min(12)].windows(4).any(|w| w == b"WEBP") {
            Some(ImageFormat::Webp)
        } else if bytes.starts_with(b"GIF") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Picks the stored format: declared type first, then content sniffing,
/// then `fallback`.
pub fn sniff_format(content_type: Option<&str>, bytes: &[u8], fallback: ImageFormat) -> ImageFormat {
    content_type
        .and_then(ImageFormat::from_content_type)
        .or_else(|| ImageFormat::from_magic_bytes(bytes))
        .unwrap_or_else(|| {
            log::debug!("Unknown image format, defaulting to {}", fallback);
            fallback
        })
}
