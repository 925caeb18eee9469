//! Decode, downscale and re-encode image payloads.
//!
//! Attached images are stored as JPEG no larger than the configured maximum
//! dimension. Thumbnails are generated on demand and never stored.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageFormat};
use serde::Serialize;

use crate::config::ImageConfig;
use crate::error::ListAllError;

/// Basic facts about a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

/// Image pipeline configured from [`ImageConfig`].
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    config: ImageConfig,
}

impl ImageProcessor {
    #[must_use]
    pub const fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    /// Check that a payload is acceptable for attachment.
    ///
    /// # Errors
    ///
    /// Returns `ListAllError::Image` if the payload is empty, too large, or
    /// not a decodable image.
    pub fn validate(&self, data: &[u8]) -> Result<ImageInfo, ListAllError> {
        if data.is_empty() {
            return Err(ListAllError::Image("Image payload is empty".to_string()));
        }
        let size = u64::try_from(data.len()).unwrap_or(u64::MAX);
        if size > self.config.max_payload_bytes {
            return Err(ListAllError::Image(format!(
                "Image is {size} bytes, larger than the {} byte limit",
                self.config.max_payload_bytes
            )));
        }

        let image = decode(data)?;
        let (width, height) = image.dimensions();
        Ok(ImageInfo {
            width,
            height,
            bytes: data.len(),
        })
    }

    /// Downscale to the maximum dimension (keeping aspect ratio) and encode as JPEG.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload fails validation or encoding fails.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>, ListAllError> {
        self.validate(data)?;
        let image = decode(data)?;
        let max = self.config.max_dimension;

        let image = if image.width() > max || image.height() > max {
            image.resize(max, max, FilterType::Lanczos3)
        } else {
            image
        };

        let encoded = encode_jpeg(&image, self.config.jpeg_quality)?;
        tracing::debug!(
            before = data.len(),
            after = encoded.len(),
            width = image.width(),
            height = image.height(),
            "compressed image"
        );
        Ok(encoded)
    }

    /// Produce a JPEG thumbnail that fits inside `size`x`size`.
    ///
    /// Uses the configured thumbnail size when `size` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be decoded or encoding fails.
    pub fn thumbnail(&self, data: &[u8], size: Option<u32>) -> Result<Vec<u8>, ListAllError> {
        let size = size.unwrap_or(self.config.thumbnail_size).max(1);
        let image = decode(data)?;
        let thumb = image.thumbnail(size, size);
        encode_jpeg(&thumb, self.config.jpeg_quality)
    }

    /// Dimensions of an already stored payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be decoded.
    pub fn info(&self, data: &[u8]) -> Result<ImageInfo, ListAllError> {
        let (width, height) = decode(data)?.dimensions();
        Ok(ImageInfo {
            width,
            height,
            bytes: data.len(),
        })
    }
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new(ImageConfig::default())
    }
}

fn decode(data: &[u8]) -> Result<DynamicImage, ListAllError> {
    image::load_from_memory(data)
        .map_err(|e| ListAllError::Image(format!("Failed to decode image: {e}")))
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ListAllError> {
    // JPEG has no alpha channel.
    let rgb = image.to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| ListAllError::Image(format!("Failed to encode JPEG: {e}")))?;
    Ok(buf.into_inner())
}

/// Whether a payload starts with a known image signature.
#[must_use]
pub fn looks_like_image(data: &[u8]) -> bool {
    image::guess_format(data).is_ok_and(|format| {
        matches!(format, ImageFormat::Jpeg | ImageFormat::Png)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn processor(max_dimension: u32) -> ImageProcessor {
        ImageProcessor::new(ImageConfig {
            max_dimension,
            thumbnail_size: 16,
            ..ImageConfig::default()
        })
    }

    #[test]
    fn test_validate_reports_dimensions() {
        let info = processor(100).validate(&png(40, 20)).unwrap();
        assert_eq!((info.width, info.height), (40, 20));
    }

    #[test]
    fn test_validate_rejects_garbage_and_empty() {
        let p = processor(100);
        assert!(matches!(p.validate(&[]), Err(ListAllError::Image(_))));
        assert!(matches!(p.validate(b"not an image"), Err(ListAllError::Image(_))));
    }

    #[test]
    fn test_validate_rejects_oversized_payload() {
        let p = ImageProcessor::new(ImageConfig {
            max_payload_bytes: 10,
            ..ImageConfig::default()
        });
        assert!(p.validate(&png(8, 8)).is_err());
    }

    #[test]
    fn test_compress_downscales_keeping_aspect() {
        let p = processor(50);
        let jpeg = p.compress(&png(200, 100)).unwrap();

        assert!(looks_like_image(&jpeg));
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let info = p.info(&jpeg).unwrap();
        assert_eq!((info.width, info.height), (50, 25));
    }

    #[test]
    fn test_compress_leaves_small_images_unscaled() {
        let p = processor(500);
        let info = p.info(&p.compress(&png(30, 10)).unwrap()).unwrap();
        assert_eq!((info.width, info.height), (30, 10));
    }

    #[test]
    fn test_thumbnail_fits_box() {
        let p = processor(500);
        let thumb = p.thumbnail(&png(64, 32), None).unwrap();
        let info = p.info(&thumb).unwrap();
        assert_eq!((info.width, info.height), (16, 8));

        let larger = p.info(&p.thumbnail(&png(64, 32), Some(32)).unwrap()).unwrap();
        assert_eq!(larger.width, 32);
    }
}
