//! In-memory document model
//!
//! A [`Document`] collects pages while an export runs. Sealing it fixes the
//! page count; overlays that depend on that count (page numbers) can only be
//! applied to the resulting [`SealedDocument`].

use crate::raster::EncodedImage;
use crate::types::PageGeometry;

/// What a page shows
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    /// First page of the external cover PDF
    Cover,
    /// One band of a content unit's raster
    Slice {
        /// Zero-based content unit index
        unit: usize,
        /// Zero-based slice index within the unit
        index: usize,
        source_y_px: u32,
        source_height_px: u32,
    },
}

/// Where the page image sits, in points. `y_pt` is measured from the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x_pt: f32,
    pub y_pt: f32,
    pub width_pt: f32,
    pub height_pt: f32,
}

impl Placement {
    /// Stretch over the whole page
    pub fn full_page(geometry: PageGeometry) -> Self {
        Self {
            x_pt: 0.0,
            y_pt: 0.0,
            width_pt: geometry.width_pt,
            height_pt: geometry.height_pt,
        }
    }

    /// Full page width from the top edge, `height_pt` tall
    pub fn top_band(geometry: PageGeometry, height_pt: f32) -> Self {
        Self {
            x_pt: 0.0,
            y_pt: 0.0,
            width_pt: geometry.width_pt,
            height_pt,
        }
    }
}

/// Annotation drawn over a page image
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Diagonal text through the page center
    Watermark { text: String },
    /// Footer label; `x_pt`/`y_pt` is the text origin in PDF user space
    PageNumber {
        number: usize,
        total: usize,
        x_pt: f32,
        y_pt: f32,
    },
}

impl Overlay {
    /// Text the overlay draws
    pub fn label(&self) -> String {
        match self {
            Overlay::Watermark { text } => text.clone(),
            Overlay::PageNumber { number, total, .. } => format!("Page {} of {}", number, total),
        }
    }
}

/// One finished page
#[derive(Debug, Clone, PartialEq)]
pub struct PageEntry {
    /// 1-based position in the document
    pub number: usize,
    pub content: PageContent,
    pub placement: Placement,
    pub image: EncodedImage,
    pub overlays: Vec<Overlay>,
}

/// Pages under construction
#[derive(Debug, Clone)]
pub struct Document {
    geometry: PageGeometry,
    pages: Vec<PageEntry>,
}

impl Document {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
        }
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    /// Append a page and return its 1-based number.
    pub fn push_page(
        &mut self,
        content: PageContent,
        placement: Placement,
        image: EncodedImage,
    ) -> usize {
        let number = self.pages.len() + 1;
        self.pages.push(PageEntry {
            number,
            content,
            placement,
            image,
            overlays: Vec::new(),
        });
        number
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[PageEntry] {
        &self.pages
    }

    /// Freeze the page sequence.
    pub fn seal(self) -> SealedDocument {
        SealedDocument {
            geometry: self.geometry,
            pages: self.pages,
        }
    }
}

/// A document whose page count is final
#[derive(Debug, Clone)]
pub struct SealedDocument {
    geometry: PageGeometry,
    pages: Vec<PageEntry>,
}

impl SealedDocument {
    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[PageEntry] {
        &self.pages
    }

    /// Pages are fixed, but their overlays are not.
    pub fn pages_mut(&mut self) -> &mut [PageEntry] {
        &mut self.pages
    }

    pub fn has_cover_page(&self) -> bool {
        self.pages
            .first()
            .is_some_and(|page| page.content == PageContent::Cover)
    }
}
