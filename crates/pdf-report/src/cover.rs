//! Cover page adapter
//!
//! Loads an external PDF and renders its first page to a bitmap. Every failure
//! here is recoverable: the export logs it and continues without a cover.

use crate::constants::COVER_PAGE_SCALE;
use crate::raster::RasterImage;
use crate::types::CoverPageError;
use image::{Rgb, RgbaImage};
use pdfium_render::prelude::*;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// pdfium initializes and tears down process-global state when a binding is
/// created and dropped, so only one cover is rendered at a time.
static PDFIUM_LOCK: Mutex<()> = Mutex::new(());

/// Where the cover PDF comes from
#[derive(Debug, Clone, PartialEq)]
pub enum CoverPageSource {
    Path(PathBuf),
    Url(String),
    Bytes(Vec<u8>),
}

impl CoverPageSource {
    /// `http://` and `https://` locations are fetched, anything else is a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            CoverPageSource::Url(location.to_string())
        } else {
            CoverPageSource::Path(PathBuf::from(location))
        }
    }

    /// Retrieve the PDF bytes and check the `%PDF` magic.
    pub async fn fetch(&self, timeout: Duration) -> Result<Vec<u8>, CoverPageError> {
        let bytes = match self {
            CoverPageSource::Path(path) => tokio::fs::read(path).await?,
            CoverPageSource::Url(url) => download(url, timeout).await?,
            CoverPageSource::Bytes(bytes) => bytes.clone(),
        };

        if !bytes.starts_with(b"%PDF") {
            return Err(CoverPageError::NotAPdf {
                magic: bytes.iter().take(4).copied().collect(),
            });
        }
        Ok(bytes)
    }
}

async fn download(url: &str, timeout: Duration) -> Result<Vec<u8>, CoverPageError> {
    log::info!("Downloading cover page from: {}", url);

    let fetch_failed = |reason: String| CoverPageError::Fetch {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| fetch_failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            CoverPageError::Timeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            }
        } else {
            fetch_failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(fetch_failed(format!("HTTP {}", response.status())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| fetch_failed(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Outcome of the cover page step
#[derive(Debug)]
pub enum CoverPage {
    Loaded(RasterImage),
    Failed(CoverPageError),
}

impl CoverPage {
    pub fn image(&self) -> Option<&RasterImage> {
        match self {
            CoverPage::Loaded(image) => Some(image),
            CoverPage::Failed(_) => None,
        }
    }

    pub fn into_image(self) -> Option<RasterImage> {
        match self {
            CoverPage::Loaded(image) => Some(image),
            CoverPage::Failed(_) => None,
        }
    }
}

/// Renders the first page of a PDF to a bitmap at one pixel per page unit.
pub trait CoverPageRenderer: Send + Sync {
    fn render_first_page(
        &self,
        pdf: Vec<u8>,
    ) -> impl Future<Output = Result<RasterImage, CoverPageError>> + Send;
}

/// Cover renderer backed by pdfium
#[derive(Debug, Clone, Default)]
pub struct PdfiumCoverRenderer {
    library_dir: Option<PathBuf>,
}

impl PdfiumCoverRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for the pdfium library in `dir` before the system search paths.
    pub fn with_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_dir = Some(dir.into());
        self
    }
}

impl CoverPageRenderer for PdfiumCoverRenderer {
    async fn render_first_page(&self, pdf: Vec<u8>) -> Result<RasterImage, CoverPageError> {
        let library_dir = self.library_dir.clone();
        tokio::task::spawn_blocking(move || render_first_page_blocking(library_dir.as_deref(), pdf))
            .await?
    }
}

fn render_first_page_blocking(
    library_dir: Option<&Path>,
    pdf: Vec<u8>,
) -> Result<RasterImage, CoverPageError> {
    let _guard = PDFIUM_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let pdfium = init_pdfium(library_dir).map_err(|e| CoverPageError::Binding(format!("{:?}", e)))?;
    let document = pdfium
        .load_pdf_from_byte_vec(pdf, None)
        .map_err(|e| CoverPageError::Parse(format!("{:?}", e)))?;

    let pages = document.pages();
    if pages.is_empty() {
        return Err(CoverPageError::NoPages);
    }
    let page = pages
        .get(0)
        .map_err(|e| CoverPageError::Render(format!("{:?}", e)))?;

    let config = PdfRenderConfig::new().scale_page_by_factor(COVER_PAGE_SCALE);
    let bitmap = page
        .render_with_config(&config)
        .map_err(|e| CoverPageError::Render(format!("{:?}", e)))?;

    let width = bitmap.width() as u32;
    let height = bitmap.height() as u32;
    let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes().to_vec()).ok_or_else(
        || CoverPageError::Render(format!("bitmap buffer does not match {}x{}", width, height)),
    )?;

    log::debug!("Rendered cover page → {}x{} px", width, height);
    Ok(RasterImage::from_rgba(&rgba, Rgb([255, 255, 255])))
}

/// Bind pdfium, trying `library_dir`, then `vendor/pdfium/lib`, then the system.
pub fn init_pdfium(library_dir: Option<&Path>) -> Result<Pdfium, PdfiumError> {
    let vendor_dir = std::env::current_dir().ok().map(|mut p| {
        p.push("vendor/pdfium/lib");
        p
    });

    for dir in library_dir.map(Path::to_path_buf).into_iter().chain(vendor_dir) {
        if !dir.exists() {
            continue;
        }
        if let Ok(binding) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
        {
            return Ok(Pdfium::new(binding));
        }
    }

    Pdfium::bind_to_system_library().map(Pdfium::new)
}

/// Fetch and render the cover. Never fails: problems come back as
/// [`CoverPage::Failed`] and are logged.
pub async fn load_cover_page<P: CoverPageRenderer>(
    source: &CoverPageSource,
    renderer: &P,
    fetch_timeout: Duration,
) -> CoverPage {
    let result = async {
        let pdf = source.fetch(fetch_timeout).await?;
        renderer.render_first_page(pdf).await
    }
    .await;

    match result {
        Ok(image) => CoverPage::Loaded(image),
        Err(e) => {
            log::warn!("Error loading cover page, continuing without it: {}", e);
            CoverPage::Failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source() {
        assert_eq!(
            CoverPageSource::parse("https://example.com/cover.pdf"),
            CoverPageSource::Url("https://example.com/cover.pdf".to_string())
        );
        assert_eq!(
            CoverPageSource::parse("HTTP://example.com/a.pdf"),
            CoverPageSource::Url("HTTP://example.com/a.pdf".to_string())
        );
        assert_eq!(
            CoverPageSource::parse(" covers/front.pdf "),
            CoverPageSource::Path(PathBuf::from("covers/front.pdf"))
        );
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_pdf_bytes() {
        let source = CoverPageSource::Bytes(b"<html>".to_vec());
        let err = source.fetch(Duration::from_secs(1)).await.unwrap_err();
        match err {
            CoverPageError::NotAPdf { magic } => assert_eq!(magic, b"<htm".to_vec()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_cover_renders_fail_independently() {
        let renderer = PdfiumCoverRenderer::new().with_library_dir("/nonexistent/pdfium");
        let broken = b"%PDF-1.4 truncated".to_vec();

        let (a, b, c) = tokio::join!(
            renderer.render_first_page(broken.clone()),
            renderer.render_first_page(broken.clone()),
            renderer.render_first_page(broken),
        );

        // Without pdfium installed binding fails; with it the bytes fail to parse.
        for result in [a, b, c] {
            assert!(matches!(
                result,
                Err(CoverPageError::Binding(_) | CoverPageError::Parse(_) | CoverPageError::NoPages)
            ));
        }
        assert!(PDFIUM_LOCK.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_fetch_missing_path_is_io_error() {
        let source = CoverPageSource::Path(PathBuf::from("/nonexistent/cover.pdf"));
        let err = source.fetch(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, CoverPageError::Io(_)));
    }
}
