//! Image XObjects and the overlay font

use crate::raster::EncodedImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Embed an encoded page image as an image XObject.
///
/// JPEG data is stored as-is (`DCTDecode`); lossless data is already
/// zlib-compressed RGB (`FlateDecode`), so the stream is not compressed again.
pub fn create_image_xobject(output: &mut Document, image: &EncodedImage) -> ObjectId {
    let dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(image.width as i64)),
        ("Height", Object::Integer(image.height as i64)),
        ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
        ("Filter", Object::Name(image.filter().as_bytes().to_vec())),
    ]);

    let stream = Stream::new(dict, image.data.clone()).with_compression(false);
    output.add_object(stream)
}

/// Standard Helvetica, shared by every page that carries overlays.
pub fn create_overlay_font(output: &mut Document) -> ObjectId {
    let mut font_dict = Dictionary::new();
    font_dict.set("Type", Object::Name(b"Font".to_vec()));
    font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
    font_dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    output.add_object(font_dict)
}
