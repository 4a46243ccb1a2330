use crate::export::ContentUnit;
use crate::options::ExportConfiguration;
use crate::raster::{Content, raster_size};
use crate::slice::plan_slices;
use crate::types::*;

/// Predict the page layout of an export without painting anything.
///
/// Uses each unit's layout size at the configured scale, so the counts match
/// what [`crate::Exporter`] produces for [`crate::SurfaceRenderer`]. The cover
/// page is counted as if it loads.
pub fn calculate_statistics<C: Content>(
    units: &[ContentUnit<C>],
    config: &ExportConfiguration,
) -> Result<ExportStatistics> {
    config.validate()?;

    let page_geometry = config.page_geometry();
    let cover_pages = usize::from(config.cover_source().is_some());

    let mut unit_stats = Vec::with_capacity(units.len());
    for (unit, content_unit) in units.iter().enumerate() {
        let (width_px, height_px) = raster_size(content_unit.content.layout_size(), config.scale)
            .map_err(|e| match e {
                ExportError::Rasterization { detail, .. } => ExportError::Rasterization { unit, detail },
                other => other,
            })?;
        let plan = plan_slices(width_px, height_px, page_geometry, content_unit.custom_height)?;

        unit_stats.push(UnitStatistics {
            unit,
            width_px,
            height_px,
            ratio: plan.ratio,
            slice_height_px: plan.slice_height_px,
            pages: plan.page_count(),
        });
    }

    let total_pages = cover_pages + unit_stats.iter().map(|u| u.pages).sum::<usize>();

    Ok(ExportStatistics {
        page_geometry,
        cover_pages,
        units: unit_stats,
        total_pages,
    })
}
