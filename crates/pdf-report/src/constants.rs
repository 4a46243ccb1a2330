//! Shared constants for report export
//!
//! This module centralizes magic numbers used by the rasterizer, the
//! overlay engine and the serializer.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

// =============================================================================
// Export Defaults
// =============================================================================

/// Default output filename
pub const DEFAULT_FILENAME: &str = "report.pdf";

/// Default raster scale factor (device pixels per layout pixel)
pub const DEFAULT_SCALE: f32 = 2.0;

/// Default lossy encoding quality (0–1)
pub const DEFAULT_QUALITY: f32 = 0.98;

/// Default margin on every side (points)
pub const DEFAULT_MARGIN_PT: f32 = 20.0;

/// Default timeout for fetching a cover page addressed by URL (seconds)
pub const DEFAULT_COVER_FETCH_TIMEOUT_SECS: u64 = 30;

/// Maximum length of a sanitized filename stem
pub const MAX_FILENAME_LEN: usize = 40;

// =============================================================================
// Rasterization
// =============================================================================

/// Width of the off-screen layout container (layout pixels)
pub const DEFAULT_LAYOUT_WIDTH_PX: u32 = 900;

/// Upper bound on waiting for content to settle before capture (milliseconds)
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 100;

/// Largest surface the rasterizer will allocate (device pixels)
pub const MAX_RASTER_PIXELS: u64 = 1 << 28;

/// Opaque background the content is captured against
pub const DEFAULT_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Scale used when rendering the cover page (1 page unit = 1 pixel)
pub const COVER_PAGE_SCALE: f32 = 1.0;

// =============================================================================
// Watermark
// =============================================================================

/// Watermark font size (points)
pub const WATERMARK_FONT_SIZE: f32 = 12.0;

/// Watermark gray level (#cccccc)
pub const WATERMARK_GRAY: f32 = 0.8;

/// Watermark rotation (degrees, counter-clockwise positive)
pub const WATERMARK_ANGLE_DEG: f32 = -45.0;

// =============================================================================
// Page Numbers
// =============================================================================

/// Font size for the page number footer (points)
pub const PAGE_NUMBER_FONT_SIZE: f32 = 10.0;

/// Page number gray level (#666666)
pub const PAGE_NUMBER_GRAY: f32 = 0.4;

/// Horizontal room reserved for the footer label inside the right margin (points)
pub const PAGE_NUMBER_LABEL_ALLOWANCE: f32 = 40.0;

/// Approximate character width ratio for Helvetica
pub const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Resource name of the overlay font
pub const OVERLAY_FONT_NAME: &str = "F1";
