use image::{Rgb, RgbImage};
use pdf_report::*;

fn geometry() -> PageGeometry {
    PageGeometry::new(500.0, 700.0)
}

#[test]
fn test_two_page_split() {
    // ratio = 2, slice height = 1400 px
    let plan = plan_slices(1000, 2500, geometry(), None).unwrap();

    assert_eq!(plan.ratio, 2.0);
    assert_eq!(plan.slice_height_px, 1400.0);
    assert_eq!(plan.page_count(), 2);

    assert_eq!(plan.slices[0].y_px, 0);
    assert_eq!(plan.slices[0].height_px, 1400);
    assert_eq!(plan.slices[0].height_pt, 700.0);

    assert_eq!(plan.slices[1].y_px, 1400);
    assert_eq!(plan.slices[1].height_px, 1100);
    assert_eq!(plan.slices[1].height_pt, 550.0);
}

#[test]
fn test_slices_tile_the_image() {
    let page_widths = [500.0, 595.2756, 612.0, 841.89];
    for &width_pt in &page_widths {
        let geometry = PageGeometry::new(width_pt, 842.0);
        for width_px in [7, 900, 1800, 2481] {
            for height_px in [1, 13, 1399, 1400, 1401, 5000, 12345] {
                let plan = plan_slices(width_px, height_px, geometry, None).unwrap();

                let total: u32 = plan.slices.iter().map(|s| s.height_px).sum();
                assert_eq!(total, height_px);

                let expected = (height_px as f64 / plan.slice_height_px).ceil() as usize;
                assert_eq!(plan.page_count(), expected);

                let mut next_row = 0;
                for (i, slice) in plan.slices.iter().enumerate() {
                    assert_eq!(slice.index, i);
                    assert_eq!(slice.y_px, next_row);
                    assert!(slice.height_px as f64 <= plan.slice_height_px.ceil());
                    next_row += slice.height_px;
                }
            }
        }
    }
}

#[test]
fn test_only_last_slice_is_shorter() {
    let plan = plan_slices(1000, 4500, geometry(), None).unwrap();
    let heights: Vec<u32> = plan.slices.iter().map(|s| s.height_px).collect();
    assert_eq!(heights, vec![1400, 1400, 1400, 300]);
}

#[test]
fn test_exact_multiple_has_no_empty_tail() {
    let plan = plan_slices(1000, 2800, geometry(), None).unwrap();
    assert_eq!(plan.page_count(), 2);
    assert!(plan.slices.iter().all(|s| s.height_px == 1400));
}

#[test]
fn test_whole_pixel_slices_do_not_drift() {
    // custom height == page width makes the slice exactly as tall as the raster is wide
    let page_widths = [500.0, 595.2756, 612.0, 841.89, 419.5276, 1190.5513];
    for &width_pt in &page_widths {
        let geometry = PageGeometry::new(width_pt, 842.0);
        for width_px in 100..3000 {
            let plan = plan_slices(width_px, 2 * width_px, geometry, Some(width_pt)).unwrap();
            let heights: Vec<u32> = plan.slices.iter().map(|s| s.height_px).collect();
            assert_eq!(
                heights,
                vec![width_px, width_px],
                "page width {} pt, raster width {} px",
                width_pt,
                width_px
            );
            assert_eq!(plan.slices[1].y_px, width_px);
        }
    }
}

#[test]
fn test_zero_height_is_noop() {
    let plan = plan_slices(1000, 0, geometry(), None).unwrap();
    assert!(plan.slices.is_empty());

    let plan = plan_slices(0, 0, geometry(), None).unwrap();
    assert_eq!(plan.page_count(), 0);
}

#[test]
fn test_zero_width_is_an_error() {
    let result = plan_slices(0, 100, geometry(), None);
    assert!(matches!(result, Err(ExportError::Slicing(_))));
}

#[test]
fn test_sub_pixel_slice_is_an_error() {
    // ratio = 0.002, slice height = 1.4 pt * 0.002 px
    let result = plan_slices(1, 100, geometry(), Some(1.4));
    assert!(matches!(result, Err(ExportError::Slicing(_))));
}

#[test]
fn test_custom_height_overrides_paper_height() {
    // ratio = 2, slice height = 200 pt * 2 = 400 px
    let plan = plan_slices(1000, 1000, geometry(), Some(200.0)).unwrap();
    let heights: Vec<u32> = plan.slices.iter().map(|s| s.height_px).collect();
    assert_eq!(heights, vec![400, 400, 200]);
    assert_eq!(plan.slices[2].height_pt, 100.0);
}

#[test]
fn test_non_positive_custom_height_is_an_error() {
    assert!(plan_slices(1000, 1000, geometry(), Some(0.0)).is_err());
    assert!(plan_slices(1000, 1000, geometry(), Some(-5.0)).is_err());
}

#[test]
fn test_slicing_is_deterministic() {
    let a = plan_slices(1234, 9876, PageGeometry::new(595.2756, 841.8898), None).unwrap();
    let b = plan_slices(1234, 9876, PageGeometry::new(595.2756, 841.8898), None).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_slice_image_copies_rows() {
    let mut pixels = RgbImage::new(4, 2500);
    for (_, y, pixel) in pixels.enumerate_pixels_mut() {
        *pixel = if y < 1400 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) };
    }
    let image = RasterImage::new(pixels);
    let plan = plan_slices(4, 2500, PageGeometry::new(2.0, 700.0), None).unwrap();

    let bands = slice_image(&image, &plan);
    assert_eq!(bands.len(), 2);

    let (first_spec, first) = &bands[0];
    assert_eq!(first_spec.height_px, 1400);
    assert_eq!((first.width(), first.height()), (4, 1400));
    assert!(first.pixels().pixels().all(|p| p.0 == [255, 0, 0]));

    let (_, second) = &bands[1];
    assert_eq!(second.height(), 1100);
    assert!(second.pixels().pixels().all(|p| p.0 == [0, 0, 255]));
}
