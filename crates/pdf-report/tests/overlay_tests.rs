use image::{Rgb, RgbImage};
use pdf_report::overlay::apply_overlays;
use pdf_report::render::write_pdf;
use pdf_report::*;

fn sealed_document(pages: usize) -> SealedDocument {
    let geometry = PageGeometry::new(500.0, 700.0);
    let mut document = Document::new(geometry);
    for index in 0..pages {
        let image = RasterImage::new(RgbImage::from_pixel(50, 70, Rgb([10, 20, 30])))
            .encode(ImageEncoding::Jpeg, 0.9)
            .unwrap();
        document.push_page(
            PageContent::Slice {
                unit: 0,
                index,
                source_y_px: index as u32 * 70,
                source_height_px: 70,
            },
            Placement::full_page(geometry),
            image,
        );
    }
    document.seal()
}

fn watermark_config() -> ExportConfiguration {
    ExportConfiguration::from_overrides(ExportOverrides {
        watermark: Some("COPY".to_string()),
        ..Default::default()
    })
}

#[test]
fn test_overlays_applied_once() {
    let mut document = sealed_document(2);
    apply_overlays(&mut document, &watermark_config());

    for page in document.pages() {
        assert_eq!(page.overlays.len(), 2);
        assert_eq!(page.overlays[0], Overlay::Watermark { text: "COPY".to_string() });
        assert_eq!(page.overlays[1].label(), format!("Page {} of 2", page.number));
    }
}

#[test]
fn test_applying_overlays_twice_stacks() {
    let mut document = sealed_document(2);
    let config = watermark_config();
    apply_overlays(&mut document, &config);
    apply_overlays(&mut document, &config);

    for page in document.pages() {
        assert_eq!(page.overlays.len(), 4);
        assert_eq!(page.overlays[0], page.overlays[2]);
        assert_eq!(page.overlays[1], page.overlays[3]);
    }

    let bytes = write_pdf(&document).unwrap();
    let pdf = lopdf::Document::load_mem(&bytes).unwrap();
    let pages: Vec<_> = pdf.get_pages().values().copied().collect();
    assert_eq!(pages.len(), 2);
    for (i, page_id) in pages.into_iter().enumerate() {
        let content = pdf.get_page_content(page_id).unwrap();
        let text = String::from_utf8_lossy(&content);
        assert_eq!(text.matches(&format!("(Page {} of 2) Tj", i + 1)).count(), 2);
        assert_eq!(text.matches("(COPY) Tj").count(), 2);
    }
}
