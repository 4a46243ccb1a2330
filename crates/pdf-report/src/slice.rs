//! Page slicer
//!
//! Cuts a tall raster into page-height bands. With `ratio = width_px /
//! page_width_pt` and slice height `s = page_height_pt * ratio`, slice `k`
//! covers source rows `[floor(k * s), min(floor((k + 1) * s), H))`. Slices
//! therefore never overlap, never leave a gap, and their heights sum to `H`.

use crate::raster::RasterImage;
use crate::types::{ExportError, PageGeometry, Result};

const SNAP_TOLERANCE: f64 = 1e-6;

/// One band of a sliced raster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceSpec {
    /// Zero-based slice index within the unit
    pub index: usize,
    /// First source row
    pub y_px: u32,
    /// Number of source rows
    pub height_px: u32,
    /// Height the band occupies on the page
    pub height_pt: f32,
}

/// How a raster of a given size splits into pages
#[derive(Debug, Clone, PartialEq)]
pub struct SlicePlan {
    /// Pixels per point
    pub ratio: f64,
    /// Nominal slice height in pixels (may be fractional)
    pub slice_height_px: f64,
    pub slices: Vec<SliceSpec>,
}

impl SlicePlan {
    pub fn page_count(&self) -> usize {
        self.slices.len()
    }
}

/// Plan the slices of a `width_px` x `height_px` raster.
///
/// `custom_height_pt` replaces the page height as the slice height when set.
pub fn plan_slices(
    width_px: u32,
    height_px: u32,
    geometry: PageGeometry,
    custom_height_pt: Option<f32>,
) -> Result<SlicePlan> {
    if height_px == 0 {
        return Ok(SlicePlan {
            ratio: 0.0,
            slice_height_px: 0.0,
            slices: Vec::new(),
        });
    }

    if width_px == 0 {
        return Err(ExportError::Slicing(format!(
            "raster is 0 pixels wide but {} pixels tall",
            height_px
        )));
    }

    let target_height_pt = custom_height_pt.unwrap_or(geometry.height_pt) as f64;
    if !target_height_pt.is_finite() || target_height_pt <= 0.0 {
        return Err(ExportError::Slicing(format!(
            "slice height must be positive, got {} pt",
            target_height_pt
        )));
    }

    let ratio = width_px as f64 / geometry.width_pt as f64;
    let slice_height_px = snap(target_height_pt * width_px as f64 / geometry.width_pt as f64);
    if !slice_height_px.is_finite() || slice_height_px < 1.0 {
        return Err(ExportError::Slicing(format!(
            "slice height of {:.3} px is below one pixel",
            slice_height_px
        )));
    }

    // Row where slice `k` starts. Computed from the exact product each time
    // so whole-pixel boundaries do not drift by accumulated rounding.
    let boundary = |k: usize| -> u64 {
        let row = k as f64 * target_height_pt * width_px as f64 / geometry.width_pt as f64;
        snap(row).floor() as u64
    };

    let total = height_px as u64;
    let mut slices = Vec::new();
    let mut index = 0;
    loop {
        let start = boundary(index);
        if start >= total {
            break;
        }
        let end = boundary(index + 1).min(total);
        if end > start {
            let height = (end - start) as u32;
            slices.push(SliceSpec {
                index,
                y_px: start as u32,
                height_px: height,
                height_pt: (height as f64 / ratio) as f32,
            });
        }
        index += 1;
    }

    Ok(SlicePlan {
        ratio,
        slice_height_px,
        slices,
    })
}

/// Round values within rounding noise of a whole pixel to that pixel.
fn snap(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < SNAP_TOLERANCE {
        rounded
    } else {
        value
    }
}

/// Cut `image` into the bands described by `plan`.
pub fn slice_image(image: &RasterImage, plan: &SlicePlan) -> Vec<(SliceSpec, RasterImage)> {
    plan.slices
        .iter()
        .map(|spec| (*spec, image.crop_rows(spec.y_px, spec.height_px)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> PageGeometry {
        PageGeometry::new(500.0, 700.0)
    }

    #[test]
    fn test_exact_division() {
        let plan = plan_slices(1000, 2800, geometry(), None).unwrap();
        assert_eq!(plan.page_count(), 2);
        assert_eq!(plan.slices[0].height_px, 1400);
        assert_eq!(plan.slices[1].y_px, 1400);
        assert!((plan.slices[1].height_pt - 700.0).abs() < 1e-3);
    }

    #[test]
    fn test_fractional_slice_height_covers_everything() {
        // slice height = 700 * 1000 / 600 = 1166.67 px
        let plan = plan_slices(1000, 2500, PageGeometry::new(600.0, 700.0), None).unwrap();
        let heights: Vec<u32> = plan.slices.iter().map(|s| s.height_px).collect();
        assert_eq!(heights, vec![1166, 1167, 167]);
        assert_eq!(plan.slices[2].y_px, 2333);
    }

    #[test]
    fn test_snap() {
        assert_eq!(snap(109.99999999999999), 110.0);
        assert_eq!(snap(1166.6666), 1166.6666);
    }
}
