//! Rasterization: content units to opaque pixel bitmaps
//!
//! - [`RasterImage`]: an RGB bitmap already flattened against its background
//! - [`EncodedImage`]: the form a bitmap is embedded in the PDF
//! - [`Surface`] / [`SurfaceRenderer`]: off-screen capture of [`Content`]
//! - [`ImageContent`]: pre-rendered bitmaps as content units

mod image_content;
mod surface;

pub use image_content::ImageContent;
pub use surface::{Content, Renderer, Surface, SurfaceRenderer, raster_size};

use crate::types::{ImageEncoding, Result};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage, RgbaImage, imageops};
use std::io::Write;

/// An opaque RGB bitmap
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbImage,
}

impl RasterImage {
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    /// Flatten an RGBA bitmap over an opaque background color.
    pub fn from_rgba(rgba: &RgbaImage, background: Rgb<u8>) -> Self {
        let pixels = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            let blend = |fg: u8, bg: u8| -> u8 {
                let alpha = a as u32;
                ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8
            };
            Rgb([
                blend(r, background.0[0]),
                blend(g, background.0[1]),
                blend(b, background.0[2]),
            ])
        });
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Copy a horizontal band of rows `[y, y + height)`.
    pub fn crop_rows(&self, y: u32, height: u32) -> RasterImage {
        let height = height.min(self.height().saturating_sub(y));
        let band = imageops::crop_imm(&self.pixels, 0, y, self.width(), height).to_image();
        RasterImage::new(band)
    }

    /// Encode for embedding. `quality` (0–1) only affects JPEG.
    pub fn encode(&self, encoding: ImageEncoding, quality: f32) -> Result<EncodedImage> {
        let data = match encoding {
            ImageEncoding::Jpeg => {
                let mut buf = Vec::new();
                JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality))
                    .encode_image(&self.pixels)?;
                buf
            }
            ImageEncoding::Lossless => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(self.pixels.as_raw())?;
                encoder.finish()?
            }
        };

        Ok(EncodedImage {
            width: self.width(),
            height: self.height(),
            encoding,
            data,
        })
    }
}

/// Map a 0–1 quality onto the JPEG 1–100 scale
fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Image bytes ready to become a PDF image XObject
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub encoding: ImageEncoding,
    pub data: Vec<u8>,
}

impl EncodedImage {
    /// PDF stream filter matching the encoding
    pub fn filter(&self) -> &'static str {
        match self.encoding {
            ImageEncoding::Jpeg => "DCTDecode",
            ImageEncoding::Lossless => "FlateDecode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_flatten_transparent_to_background() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let flat = RasterImage::from_rgba(&rgba, Rgb([255, 255, 255]));
        assert!(flat.pixels().pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn test_flatten_keeps_opaque_pixels() {
        let rgba = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255]));
        let flat = RasterImage::from_rgba(&rgba, Rgb([255, 255, 255]));
        assert_eq!(flat.pixels().get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_crop_rows_clamps_to_image() {
        let image = RasterImage::new(RgbImage::new(4, 10));
        assert_eq!(image.crop_rows(8, 5).height(), 2);
        assert_eq!(image.crop_rows(0, 3).width(), 4);
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(jpeg_quality(0.98), 98);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(1.0), 100);
    }

    #[test]
    fn test_encode_lossless_is_zlib_of_samples() {
        use flate2::read::ZlibDecoder;
        use std::io::Read;

        let image = RasterImage::new(RgbImage::from_pixel(3, 2, Rgb([1, 2, 3])));
        let encoded = image.encode(ImageEncoding::Lossless, 0.5).unwrap();
        assert_eq!(encoded.filter(), "FlateDecode");

        let mut samples = Vec::new();
        ZlibDecoder::new(encoded.data.as_slice())
            .read_to_end(&mut samples)
            .unwrap();
        assert_eq!(samples, image.pixels().as_raw().clone());
    }

    #[test]
    fn test_encode_jpeg_has_soi_marker() {
        let image = RasterImage::new(RgbImage::from_pixel(8, 8, Rgb([200, 10, 10])));
        let encoded = image.encode(ImageEncoding::Jpeg, 0.98).unwrap();
        assert_eq!(encoded.filter(), "DCTDecode");
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);
        assert_eq!((encoded.width, encoded.height), (8, 8));
    }
}
