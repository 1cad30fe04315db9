//! Poster encoding for storage and the default poster.
//!
//! Posters are stored either exactly as downloaded or re-encoded as JPEG for
//! media servers that cannot read WebP. The default poster is always JPEG.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use super::poster::{Poster, PosterFormat};

/// Size of the generated default poster, 2:3 like the artwork it replaces.
const DEFAULT_WIDTH: u32 = 400;
const DEFAULT_HEIGHT: u32 = 600;
const DEFAULT_COLOUR: Rgb<u8> = Rgb([21, 21, 30]);

/// Bytes to write for `poster`.
pub fn encode_for_storage(poster: &Poster, convert_to_jpg: bool) -> Result<Vec<u8>> {
    if convert_to_jpg && poster.format != PosterFormat::Jpeg {
        to_jpeg(&poster.bytes, Some(poster.format.image_format()))
    } else {
        Ok(poster.bytes.to_vec())
    }
}

/// Re-encode image data as JPEG. Alpha is dropped since JPEG has none.
pub fn to_jpeg(data: &[u8], format: Option<ImageFormat>) -> Result<Vec<u8>> {
    let img = match format {
        Some(format) => image::load_from_memory_with_format(data, format),
        None => image::load_from_memory(data),
    }
    .context("Failed to decode poster image")?;

    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageFormat::Jpeg)
        .context("Failed to encode poster as JPEG")?;
    Ok(buf.into_inner())
}

/// Poster used whenever nothing could be fetched.
#[derive(Debug, Clone)]
pub struct DefaultImage {
    bytes: Bytes,
}

impl DefaultImage {
    /// Load the configured default image, or generate a plain one.
    ///
    /// Anything that is not already a JPEG is converted, since the default
    /// poster is always stored with a `.jpg` extension.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Self::generated();
        };

        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read default image: {:?}", path))?;

        let bytes = match PosterFormat::detect(&data) {
            Some(PosterFormat::Jpeg) => data,
            _ => to_jpeg(&data, None)
                .with_context(|| format!("Default image is not a usable image: {:?}", path))?,
        };

        Ok(Self {
            bytes: Bytes::from(bytes),
        })
    }

    /// A solid dark poster.
    pub fn generated() -> Result<Self> {
        let img = RgbImage::from_pixel(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_COLOUR);
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Jpeg)
            .context("Failed to encode default poster")?;
        Ok(Self {
            bytes: Bytes::from(buf.into_inner()),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 6, image::Rgba([200, 10, 10, 128]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_passthrough_without_conversion() {
        let poster = Poster::new(png_bytes(), PosterFormat::Png);
        let stored = encode_for_storage(&poster, false).unwrap();
        assert_eq!(stored, poster.bytes.to_vec());
    }

    #[test]
    fn test_conversion_to_jpeg() {
        let poster = Poster::new(png_bytes(), PosterFormat::Png);
        let stored = encode_for_storage(&poster, true).unwrap();
        assert_eq!(PosterFormat::detect(&stored), Some(PosterFormat::Jpeg));

        let decoded = image::load_from_memory(&stored).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 6));
    }

    #[test]
    fn test_conversion_of_garbage_fails() {
        let poster = Poster::new(b"not an image".to_vec(), PosterFormat::Webp);
        assert!(encode_for_storage(&poster, true).is_err());
    }

    #[test]
    fn test_generated_default_is_jpeg() {
        let default = DefaultImage::load(None).unwrap();
        assert_eq!(PosterFormat::detect(default.bytes()), Some(PosterFormat::Jpeg));
    }

    #[test]
    fn test_configured_default_is_converted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fallback.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let default = DefaultImage::load(Some(&path)).unwrap();
        assert_eq!(PosterFormat::detect(default.bytes()), Some(PosterFormat::Jpeg));
    }

    #[test]
    fn test_missing_default_is_error() {
        assert!(DefaultImage::load(Some(Path::new("/nonexistent/default.jpg"))).is_err());
    }
}
