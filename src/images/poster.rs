//! Poster payloads passed from the poster sources to the metadata sink.

use bytes::Bytes;
use image::ImageFormat;

/// Encodings a poster can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterFormat {
    Webp,
    Jpeg,
    Png,
}

impl PosterFormat {
    /// File extension used when the poster is stored unconverted.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Map an HTTP `Content-Type` value, ignoring parameters.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "image/webp" => Some(Self::Webp),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Sniff the format from the leading bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        match image::guess_format(data).ok()? {
            ImageFormat::WebP => Some(Self::Webp),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            _ => None,
        }
    }

    pub(crate) fn image_format(&self) -> ImageFormat {
        match self {
            Self::Webp => ImageFormat::WebP,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// A downloaded poster.
#[derive(Debug, Clone)]
pub struct Poster {
    pub bytes: Bytes,
    pub format: PosterFormat,
}

impl Poster {
    pub fn new(bytes: impl Into<Bytes>, format: PosterFormat) -> Self {
        Self {
            bytes: bytes.into(),
            format,
        }
    }
}

/// What the sink has to do about a poster.
#[derive(Debug, Clone)]
pub enum PosterArtwork {
    /// A poster file is already on disk; nothing to write.
    Existing,
    /// Store these bytes.
    Fetched(Poster),
    /// Nothing usable was fetched; store the default image.
    Default,
}

impl PosterArtwork {
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}
