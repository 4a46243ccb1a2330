use super::RasterImage;
use crate::constants::{DEFAULT_BACKGROUND, DEFAULT_SETTLE_TIMEOUT_MS, MAX_RASTER_PIXELS};
use crate::types::{ExportError, Result};
use image::{Rgb, Rgba, RgbaImage};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Something that can be laid out and painted onto a [`Surface`].
pub trait Content: Send + Sync {
    /// Natural size in layout pixels
    fn layout_size(&self) -> (u32, u32);

    /// Resolves once the content is ready to be captured.
    fn settled(&self) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }

    /// Paint the content. The surface is already scaled to device pixels.
    fn paint(&self, surface: &mut Surface) -> Result<()>;
}

/// Turns content into an opaque bitmap.
pub trait Renderer<C: ?Sized>: Send + Sync {
    fn rasterize(&self, content: &C, scale: f32) -> impl Future<Output = Result<RasterImage>> + Send;
}

/// Device-pixel size of a layout at `scale`.
///
/// Fails when the result would exceed [`MAX_RASTER_PIXELS`].
pub fn raster_size(layout: (u32, u32), scale: f32) -> Result<(u32, u32)> {
    let (w, h) = layout;
    let width = (w as f64 * scale as f64).ceil();
    let height = (h as f64 * scale as f64).ceil();

    if !(width * height <= MAX_RASTER_PIXELS as f64)
        || width > u32::MAX as f64
        || height > u32::MAX as f64
    {
        return Err(ExportError::Rasterization {
            unit: 0,
            detail: format!(
                "{}x{} layout at scale {} exceeds the {} pixel surface limit",
                w, h, scale, MAX_RASTER_PIXELS
            ),
        });
    }
    Ok((width as u32, height as u32))
}

/// Off-screen drawing target.
///
/// Counts itself in the owning renderer's live-surface counter while mounted;
/// dropping it unmounts it on every exit path.
pub struct Surface {
    canvas: RgbaImage,
    background: Rgb<u8>,
    scale: f32,
    live: Arc<AtomicUsize>,
}

impl Surface {
    fn mount(width: u32, height: u32, scale: f32, background: Rgb<u8>, live: Arc<AtomicUsize>) -> Self {
        let [r, g, b] = background.0;
        live.fetch_add(1, Ordering::SeqCst);
        log::debug!("Mounted {}x{} surface at scale {}", width, height, scale);
        Self {
            canvas: RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])),
            background,
            scale,
            live,
        }
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// Device pixels per layout pixel
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn canvas_mut(&mut self) -> &mut RgbaImage {
        &mut self.canvas
    }

    fn capture(&self) -> RasterImage {
        RasterImage::from_rgba(&self.canvas, self.background)
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        log::debug!("Unmounted {}x{} surface", self.width(), self.height());
    }
}

/// Renders [`Content`] through a temporary [`Surface`].
#[derive(Debug, Clone)]
pub struct SurfaceRenderer {
    settle_timeout: Duration,
    background: Rgb<u8>,
    live: Arc<AtomicUsize>,
}

impl Default for SurfaceRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceRenderer {
    pub fn new() -> Self {
        Self {
            settle_timeout: Duration::from_millis(DEFAULT_SETTLE_TIMEOUT_MS),
            background: Rgb(DEFAULT_BACKGROUND),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    pub fn with_background(mut self, background: Rgb<u8>) -> Self {
        self.background = background;
        self
    }

    /// Surfaces currently mounted by this renderer
    pub fn live_surfaces(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl<C: Content> Renderer<C> for SurfaceRenderer {
    async fn rasterize(&self, content: &C, scale: f32) -> Result<RasterImage> {
        let (width, height) = raster_size(content.layout_size(), scale)?;
        let mut surface = Surface::mount(width, height, scale, self.background, self.live.clone());

        tokio::time::timeout(self.settle_timeout, content.settled())
            .await
            .map_err(|_| ExportError::Rasterization {
                unit: 0,
                detail: format!(
                    "content did not settle within {}ms",
                    self.settle_timeout.as_millis()
                ),
            })?;

        content
            .paint(&mut surface)
            .map_err(|e| match e {
                ExportError::Rasterization { .. } => e,
                other => ExportError::Rasterization {
                    unit: 0,
                    detail: other.to_string(),
                },
            })?;
        Ok(surface.capture())
    }
}
