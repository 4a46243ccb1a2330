use super::surface::{Content, Surface};
use crate::constants::DEFAULT_LAYOUT_WIDTH_PX;
use crate::types::Result;
use image::{RgbaImage, imageops};
use std::path::Path;

/// A pre-rendered bitmap laid out at a fixed container width.
///
/// The layout height follows the bitmap's aspect ratio, so a 1800x5000 image
/// in the default 900px container lays out as 900x2500.
#[derive(Debug, Clone)]
pub struct ImageContent {
    bitmap: RgbaImage,
    layout_width: u32,
}

impl ImageContent {
    pub fn new(bitmap: RgbaImage) -> Self {
        Self {
            bitmap,
            layout_width: DEFAULT_LAYOUT_WIDTH_PX,
        }
    }

    pub fn with_layout_width(mut self, layout_width: u32) -> Self {
        self.layout_width = layout_width;
        self
    }

    /// Decode an image from memory (PNG, JPEG, ...)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bitmap = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self::new(bitmap))
    }

    /// Read and decode an image file
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        tokio::task::spawn_blocking(move || Self::from_bytes(&bytes)).await?
    }

    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }
}

impl Content for ImageContent {
    fn layout_size(&self) -> (u32, u32) {
        let (w, h) = self.bitmap.dimensions();
        if w == 0 {
            return (self.layout_width, 0);
        }
        let height = (h as f64 * self.layout_width as f64 / w as f64).round() as u32;
        (self.layout_width, height)
    }

    fn paint(&self, surface: &mut Surface) -> Result<()> {
        let (width, height) = (surface.width(), surface.height());
        if width == 0 || height == 0 || self.bitmap.width() == 0 || self.bitmap.height() == 0 {
            return Ok(());
        }

        let scaled = if self.bitmap.dimensions() == (width, height) {
            self.bitmap.clone()
        } else {
            imageops::resize(&self.bitmap, width, height, imageops::FilterType::Lanczos3)
        };
        imageops::overlay(surface.canvas_mut(), &scaled, 0, 0);
        Ok(())
    }
}
