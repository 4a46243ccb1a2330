//! Overlay engine: watermark and page number footer
//!
//! Overlays are attached to pages of a [`SealedDocument`] as typed values and
//! turned into content stream operators by the serializer. Applying an
//! overlay twice draws it twice.

use crate::constants::*;
use crate::document::{Overlay, SealedDocument};
use crate::options::ExportConfiguration;
use crate::types::{Margins, PageGeometry};

/// Stamp `text` diagonally across every page, the cover included.
pub fn apply_watermark(document: &mut SealedDocument, text: &str) {
    for page in document.pages_mut() {
        page.overlays.push(Overlay::Watermark {
            text: text.to_string(),
        });
    }
    log::debug!("Watermarked {} pages", document.page_count());
}

/// Add a "Page i of N" footer to every page.
pub fn apply_page_numbers(document: &mut SealedDocument, margins: &Margins) {
    let total = document.page_count();
    let geometry = document.geometry();
    let x_pt = geometry.width_pt - margins.right - PAGE_NUMBER_LABEL_ALLOWANCE;
    let y_pt = margins.bottom;

    for page in document.pages_mut() {
        page.overlays.push(Overlay::PageNumber {
            number: page.number,
            total,
            x_pt,
            y_pt,
        });
    }
}

/// Watermark (when configured) then page numbers.
pub fn apply_overlays(document: &mut SealedDocument, config: &ExportConfiguration) {
    if let Some(text) = config.watermark_text() {
        apply_watermark(document, text);
    }
    apply_page_numbers(document, &config.margins);
}

/// Content stream operators drawing `overlay` with the font resource `/F1`.
pub fn overlay_operators(overlay: &Overlay, geometry: PageGeometry) -> String {
    let label = escape_pdf_text(&overlay.label());
    match overlay {
        Overlay::Watermark { .. } => {
            let (cx, cy) = geometry.center();
            let (sin, cos) = WATERMARK_ANGLE_DEG.to_radians().sin_cos();
            let half_width = text_width(&label, WATERMARK_FONT_SIZE) / 2.0;
            format!(
                "q {} g BT /{} {} Tf {:.4} {:.4} {:.4} {:.4} {} {} Tm {} 0 Td ({}) Tj ET Q\n",
                WATERMARK_GRAY,
                OVERLAY_FONT_NAME,
                WATERMARK_FONT_SIZE,
                cos,
                sin,
                -sin,
                cos,
                cx,
                cy,
                -half_width,
                label
            )
        }
        Overlay::PageNumber { x_pt, y_pt, .. } => format!(
            "q {} g BT /{} {} Tf {} {} Td ({}) Tj ET Q\n",
            PAGE_NUMBER_GRAY, OVERLAY_FONT_NAME, PAGE_NUMBER_FONT_SIZE, x_pt, y_pt, label
        ),
    }
}

/// Approximate Helvetica advance width
fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * HELVETICA_CHAR_WIDTH_RATIO
}

/// Escape a string for a PDF literal. Non-ASCII becomes `?` (standard encoding).
pub fn escape_pdf_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => escaped.push(c),
            _ => escaped.push('?'),
        }
    }
    escaped
}
