use crate::constants::{DEFAULT_MARGIN_PT, mm_to_pt};
use thiserror::Error;

/// Fatal export errors. Any of these aborts the whole export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Content unit {unit} failed to render: {detail}")]
    Rasterization { unit: usize, detail: String },
    #[error("Slicing failed: {0}")]
    Slicing(String),
    #[error("PDF serialization failed: {0}")]
    Serialization(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ExportError {
    /// Message safe to show to an end user. Details belong in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            ExportError::Config(_) => {
                "The export options are invalid. Please review them and try again."
            }
            _ => "There was an error generating the PDF. Please try again.",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Cover page failures. Never fatal: the export continues without a cover.
#[derive(Error, Debug)]
pub enum CoverPageError {
    #[error("Cover page not readable: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to download cover page '{url}': {reason}")]
    Fetch { url: String, reason: String },
    #[error("Cover page download timed out after {secs}s for '{url}'")]
    Timeout { url: String, secs: u64 },
    #[error("Cover page is not a PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },
    #[error("Failed to bind to pdfium library: {0}")]
    Binding(String),
    #[error("Cover page PDF could not be parsed: {0}")]
    Parse(String),
    #[error("Cover page PDF has no pages")]
    NoPages,
    #[error("Cover page rendering failed: {0}")]
    Render(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    /// Portrait: height > width
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Supported paper formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PaperFormat {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PaperFormat {
    /// Get base dimensions (always portrait)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperFormat::A4 => (210.0, 297.0),
            PaperFormat::Letter => (215.9, 279.4),
            PaperFormat::Legal => (215.9, 355.6),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Page size of the output document in points. Fixed for a whole document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageGeometry {
    pub fn new(width_pt: f32, height_pt: f32) -> Self {
        Self {
            width_pt,
            height_pt,
        }
    }

    pub fn from_format(format: PaperFormat, orientation: Orientation) -> Self {
        let (w, h) = format.dimensions_with_orientation(orientation);
        Self::new(mm_to_pt(w), mm_to_pt(h))
    }

    /// Page center in PDF user space
    pub fn center(&self) -> (f32, f32) {
        (self.width_pt / 2.0, self.height_pt / 2.0)
    }
}

/// Page margins in points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(DEFAULT_MARGIN_PT)
    }
}

impl Margins {
    /// Create uniform margins on all sides
    pub fn uniform(margin_pt: f32) -> Self {
        Self {
            top: margin_pt,
            bottom: margin_pt,
            left: margin_pt,
            right: margin_pt,
        }
    }

    fn values(&self) -> [f32; 4] {
        [self.top, self.bottom, self.left, self.right]
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.values().iter().all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// How page images are embedded in the PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ImageEncoding {
    /// JPEG at the configured quality (DCTDecode)
    #[default]
    Jpeg,
    /// Zlib-compressed RGB samples (FlateDecode)
    Lossless,
}

/// Predicted layout of one content unit
#[derive(Debug, Clone, PartialEq)]
pub struct UnitStatistics {
    /// Zero-based position in the submitted units
    pub unit: usize,
    pub width_px: u32,
    pub height_px: u32,
    /// Pixels per point
    pub ratio: f64,
    pub slice_height_px: f64,
    pub pages: usize,
}

/// Predicted layout of a whole export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportStatistics {
    pub page_geometry: PageGeometry,
    /// 1 if a cover page is configured (assuming it loads), else 0
    pub cover_pages: usize,
    pub units: Vec<UnitStatistics>,
    pub total_pages: usize,
}
