//! Output page rendering

use super::xobject::{create_image_xobject, create_overlay_font};
use crate::constants::OVERLAY_FONT_NAME;
use crate::document::{PageEntry, Placement, SealedDocument};
use crate::overlay::overlay_operators;
use crate::types::{ExportError, PageGeometry, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Name of the page image in each page's resources
const PAGE_IMAGE_NAME: &str = "Im0";

/// Serialize a sealed document to PDF bytes.
pub fn write_pdf(document: &SealedDocument) -> Result<Vec<u8>> {
    let geometry = document.geometry();
    let mut output = Document::with_version("1.5");
    let pages_tree_id = output.new_object_id();

    let needs_font = document.pages().iter().any(|page| !page.overlays.is_empty());
    let font_id = needs_font.then(|| create_overlay_font(&mut output));

    let mut page_refs = Vec::with_capacity(document.page_count());
    for page in document.pages() {
        let page_id = render_page(&mut output, page, geometry, pages_tree_id, font_id);
        page_refs.push(Object::Reference(page_id));
    }

    // Create pages tree
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    let mut writer = Vec::new();
    output
        .save_to(&mut writer)
        .map_err(|e| ExportError::Serialization(e.to_string()))?;

    log::debug!(
        "Serialized {} pages into {} bytes",
        document.page_count(),
        writer.len()
    );
    Ok(writer)
}

/// Add one page (image, then overlays) to `output`.
pub fn render_page(
    output: &mut Document,
    page: &PageEntry,
    geometry: PageGeometry,
    parent_pages_id: ObjectId,
    font_id: Option<ObjectId>,
) -> ObjectId {
    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(geometry.width_pt),
            Object::Real(geometry.height_pt),
        ]),
    );

    let image_id = create_image_xobject(output, &page.image);
    let mut xobjects = Dictionary::new();
    xobjects.set(PAGE_IMAGE_NAME, Object::Reference(image_id));

    let mut content_ops = vec![image_placement_command(&page.placement, geometry)];
    content_ops.extend(
        page.overlays
            .iter()
            .map(|overlay| overlay_operators(overlay, geometry)),
    );

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));
    if let Some(font_id) = font_id.filter(|_| !page.overlays.is_empty()) {
        let mut fonts = Dictionary::new();
        fonts.set(OVERLAY_FONT_NAME, Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(fonts));
    }

    let content = content_ops.join("");
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    output.add_object(page_dict)
}

/// Scale the unit-square image to its placement; PDF y grows upwards.
fn image_placement_command(placement: &Placement, geometry: PageGeometry) -> String {
    let y = geometry.height_pt - placement.y_pt - placement.height_pt;
    format!(
        "q {} 0 0 {} {} {} cm /{} Do Q\n",
        placement.width_pt, placement.height_pt, placement.x_pt, y, PAGE_IMAGE_NAME
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_band_sits_at_top_edge() {
        let geometry = PageGeometry::new(500.0, 700.0);
        let ops = image_placement_command(&Placement::top_band(geometry, 550.0), geometry);
        assert_eq!(ops, "q 500 0 0 550 0 150 cm /Im0 Do Q\n");
    }
}
