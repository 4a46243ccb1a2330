//! PDF serialization
//!
//! This module turns a sealed document into PDF bytes:
//! - Embedding page images as image XObjects
//! - Building one page per entry with its overlays
//! - Writing the pages tree, catalog and trailer

mod page;
mod xobject;

pub use page::{render_page, write_pdf};
pub use xobject::{create_image_xobject, create_overlay_font};
