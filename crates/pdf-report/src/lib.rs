pub mod constants;
pub mod cover;
pub mod document;
mod export;
mod filename;
mod options;
pub mod overlay;
pub mod raster;
pub mod render;
pub mod slice;
mod stats;
mod types;

pub use cover::{CoverPage, CoverPageRenderer, CoverPageSource, PdfiumCoverRenderer, load_cover_page};
pub use document::{Document, Overlay, PageContent, PageEntry, Placement, SealedDocument};
pub use export::{ContentUnit, ExportArtifact, ExportProgress, Exporter};
pub use filename::{download_name, sanitize_filename};
pub use options::*;
pub use raster::{
    Content, EncodedImage, ImageContent, RasterImage, Renderer, Surface, SurfaceRenderer,
};
pub use slice::{SlicePlan, SliceSpec, plan_slices, slice_image};
pub use stats::calculate_statistics;
pub use types::*;
