//! Document assembler
//!
//! Drives one export: validate, cover page, rasterize and slice each content
//! unit in order, seal, overlay, serialize.

use crate::cover::{CoverPageRenderer, PdfiumCoverRenderer, load_cover_page};
use crate::document::{Document, PageContent, Placement};
use crate::filename::download_name;
use crate::options::ExportConfiguration;
use crate::overlay::apply_overlays;
use crate::raster::{EncodedImage, RasterImage, Renderer};
use crate::render::write_pdf;
use crate::slice::{SliceSpec, plan_slices, slice_image};
use crate::types::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A renderable payload and how it is paginated
#[derive(Debug, Clone)]
pub struct ContentUnit<C> {
    pub content: C,
    /// Start this unit on a new page. Every unit already does, so this is
    /// informational.
    pub page_break: bool,
    /// Slice height in points, replacing the paper height for this unit
    pub custom_height: Option<f32>,
}

impl<C> ContentUnit<C> {
    pub fn new(content: C) -> Self {
        Self {
            content,
            page_break: false,
            custom_height: None,
        }
    }

    pub fn with_page_break(mut self, page_break: bool) -> Self {
        self.page_break = page_break;
        self
    }

    pub fn with_custom_height(mut self, height_pt: f32) -> Self {
        self.custom_height = Some(height_pt);
        self
    }
}

/// Milestones reported while an export runs
#[derive(Debug, Clone, PartialEq)]
pub enum ExportProgress {
    CoverPage { loaded: bool },
    UnitRendered { unit: usize, total_units: usize, pages: usize },
    Overlaid { pages: usize },
    Serialized { bytes: usize },
}

type ProgressFn = Arc<dyn Fn(ExportProgress) + Send + Sync>;

/// The finished PDF and the name it should be offered under
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub cover_page: bool,
}

impl ExportArtifact {
    /// Write the PDF into `dir` under its download name.
    ///
    /// The bytes go to a temporary file that is renamed into place, so a
    /// partially written PDF is never visible.
    pub async fn save_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(&self.filename);
        let tmp_path = dir.join(format!(".{}.tmp", self.filename));
        tokio::fs::write(&tmp_path, &self.bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        log::info!("Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Runs exports with a fixed configuration.
pub struct Exporter<R, P = PdfiumCoverRenderer> {
    config: ExportConfiguration,
    renderer: R,
    cover_renderer: P,
    progress: Option<ProgressFn>,
}

impl<R> Exporter<R, PdfiumCoverRenderer> {
    pub fn new(config: ExportConfiguration, renderer: R) -> Self {
        Self {
            config,
            renderer,
            cover_renderer: PdfiumCoverRenderer::new(),
            progress: None,
        }
    }
}

impl<R, P> Exporter<R, P> {
    pub fn with_cover_renderer<Q>(self, cover_renderer: Q) -> Exporter<R, Q> {
        Exporter {
            config: self.config,
            renderer: self.renderer,
            cover_renderer,
            progress: self.progress,
        }
    }

    pub fn with_progress(mut self, progress: impl Fn(ExportProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn config(&self) -> &ExportConfiguration {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn report(&self, progress: ExportProgress) {
        if let Some(callback) = &self.progress {
            callback(progress);
        }
    }
}

impl<R, P: CoverPageRenderer> Exporter<R, P> {
    /// Export `units` into a single PDF.
    ///
    /// Fails as a whole: on error no artifact is produced and the partial
    /// document is dropped. A cover page that cannot be loaded is skipped.
    pub async fn export<C>(&self, units: &[ContentUnit<C>]) -> Result<ExportArtifact>
    where
        C: Send + Sync,
        R: Renderer<C>,
    {
        match self.run(units).await {
            Ok(artifact) => Ok(artifact),
            Err(e) => {
                log::error!("Error generating PDF: {}", e);
                Err(e)
            }
        }
    }

    /// Export a single content unit, offered under `filename` instead of the
    /// configured name.
    pub async fn export_single<C>(&self, content: C, filename: &str) -> Result<ExportArtifact>
    where
        C: Send + Sync,
        R: Renderer<C>,
    {
        let mut artifact = self.export(&[ContentUnit::new(content)]).await?;
        artifact.filename = download_name(filename);
        Ok(artifact)
    }

    /// Export and save into `dir`. Returns the written path.
    pub async fn export_to_dir<C>(
        &self,
        units: &[ContentUnit<C>],
        dir: impl AsRef<Path>,
    ) -> Result<(PathBuf, ExportArtifact)>
    where
        C: Send + Sync,
        R: Renderer<C>,
    {
        let artifact = self.export(units).await?;
        let path = artifact.save_in(dir).await?;
        Ok((path, artifact))
    }

    async fn run<C>(&self, units: &[ContentUnit<C>]) -> Result<ExportArtifact>
    where
        C: Send + Sync,
        R: Renderer<C>,
    {
        self.config.validate()?;
        validate_units(units)?;

        let geometry = self.config.page_geometry();
        let encoding = self.config.encoding;
        let quality = self.config.quality;
        log::info!(
            "Exporting {} content units on {:?} {:?} ({:.1} x {:.1} pt)",
            units.len(),
            self.config.format,
            self.config.orientation,
            geometry.width_pt,
            geometry.height_pt
        );

        let mut document = Document::new(geometry);

        if let Some(source) = self.config.cover_source() {
            let cover = load_cover_page(
                &source,
                &self.cover_renderer,
                self.config.cover_fetch_timeout(),
            )
            .await;
            let loaded = cover.image().is_some();
            if let Some(image) = cover.into_image() {
                let encoded =
                    tokio::task::spawn_blocking(move || image.encode(encoding, quality)).await??;
                document.push_page(PageContent::Cover, Placement::full_page(geometry), encoded);
            }
            self.report(ExportProgress::CoverPage { loaded });
        }

        for (index, unit) in units.iter().enumerate() {
            if unit.page_break && document.page_count() > 0 {
                log::debug!("Unit {} requests a page break", index);
            }

            let image = self
                .renderer
                .rasterize(&unit.content, self.config.scale)
                .await
                .map_err(|e| match e {
                    ExportError::Rasterization { detail, .. } => {
                        ExportError::Rasterization { unit: index, detail }
                    }
                    other => other,
                })?;
            log::debug!("Unit {} rasterized to {}x{} px", index, image.width(), image.height());

            let custom_height = unit.custom_height;
            let slices = tokio::task::spawn_blocking(move || {
                slice_and_encode(&image, geometry, custom_height, encoding, quality)
            })
            .await??;

            let pages = slices.len();
            for (spec, encoded) in slices {
                let number = document.push_page(
                    PageContent::Slice {
                        unit: index,
                        index: spec.index,
                        source_y_px: spec.y_px,
                        source_height_px: spec.height_px,
                    },
                    Placement::top_band(geometry, spec.height_pt),
                    encoded,
                );
                log::debug!(
                    "Page {}: unit {} slice {} ({} px from row {})",
                    number,
                    index,
                    spec.index,
                    spec.height_px,
                    spec.y_px
                );
            }

            self.report(ExportProgress::UnitRendered {
                unit: index,
                total_units: units.len(),
                pages,
            });
        }

        let mut sealed = document.seal();
        apply_overlays(&mut sealed, &self.config);
        let page_count = sealed.page_count();
        let cover_page = sealed.has_cover_page();
        self.report(ExportProgress::Overlaid { pages: page_count });

        let bytes = tokio::task::spawn_blocking(move || write_pdf(&sealed)).await??;
        self.report(ExportProgress::Serialized { bytes: bytes.len() });

        let filename = download_name(&self.config.filename);
        log::info!("Generated {} with {} pages", filename, page_count);

        Ok(ExportArtifact {
            filename,
            bytes,
            page_count,
            cover_page,
        })
    }
}

fn validate_units<C>(units: &[ContentUnit<C>]) -> Result<()> {
    for (index, unit) in units.iter().enumerate() {
        if let Some(height) = unit.custom_height {
            if !height.is_finite() || height <= 0.0 {
                return Err(ExportError::Config(format!(
                    "Content unit {} has a non-positive custom height ({})",
                    index, height
                )));
            }
        }
    }
    Ok(())
}

fn slice_and_encode(
    image: &RasterImage,
    geometry: PageGeometry,
    custom_height: Option<f32>,
    encoding: ImageEncoding,
    quality: f32,
) -> Result<Vec<(SliceSpec, EncodedImage)>> {
    let plan = plan_slices(image.width(), image.height(), geometry, custom_height)?;
    slice_image(image, &plan)
        .into_iter()
        .map(|(spec, band)| Ok((spec, band.encode(encoding, quality)?)))
        .collect()
}
