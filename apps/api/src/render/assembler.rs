//! Document assembly: serializes rendered pages, in index order, into one
//! multi-page PDF.
//!
//! Each page raster is embedded as a Flate-compressed DeviceRGB image
//! XObject and drawn to fill the page media box. Pages were rasterized at
//! the run's dpi, so the media box is `px × 72 / dpi` points; at the
//! default config that makes the physical page exactly 8.5 × 11 in.

use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};

use crate::layout::LayoutError;
use crate::render::compositor::RenderedPage;

const POINTS_PER_INCH: f64 = 72.0;
const ZLIB_LEVEL: u8 = 6;

/// Assembles rendered pages into PDF bytes.
///
/// Requires at least one page; an empty run is `EmptyDocument`. Pages are
/// emitted exactly as rendered: no reordering, resizing, or cropping.
pub fn assemble(pages: &[RenderedPage], dpi: f64) -> Result<Vec<u8>, LayoutError> {
    if pages.is_empty() {
        return Err(LayoutError::EmptyDocument);
    }

    let mut pdf = Pdf::new();
    let mut next_ref = 1;
    let mut alloc = move || {
        let r = Ref::new(next_ref);
        next_ref += 1;
        r
    };

    let catalog_id = alloc();
    let page_tree_id = alloc();

    // Allocate ids for every page up front so the tree can be written
    // before the page bodies.
    let page_ids: Vec<Ref> = pages.iter().map(|_| alloc()).collect();

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(pages.len() as i32);

    for (page, &page_id) in pages.iter().zip(&page_ids) {
        let image_id = alloc();
        let content_id = alloc();

        let (px_w, px_h) = page.pixels.dimensions();
        let pt_w = (px_w as f64 * POINTS_PER_INCH / dpi) as f32;
        let pt_h = (px_h as f64 * POINTS_PER_INCH / dpi) as f32;
        let image_name = Name(b"Im0");

        {
            let mut node = pdf.page(page_id);
            node.parent(page_tree_id);
            node.media_box(Rect::new(0.0, 0.0, pt_w, pt_h));
            node.contents(content_id);
            node.resources().x_objects().pair(image_name, image_id);
        }

        let compressed = compress_to_vec_zlib(page.pixels.as_raw(), ZLIB_LEVEL);
        let mut xobj = pdf.image_xobject(image_id, &compressed);
        xobj.filter(Filter::FlateDecode);
        xobj.width(px_w as i32);
        xobj.height(px_h as i32);
        xobj.color_space().device_rgb();
        xobj.bits_per_component(8);
        xobj.finish();

        // Image space is a unit square; scale it to cover the full page.
        let mut content = Content::new();
        content.save_state();
        content.transform([pt_w, 0.0, 0.0, pt_h, 0.0, 0.0]);
        content.x_object(image_name);
        content.restore_state();
        pdf.stream(content_id, &content.finish());
    }

    Ok(pdf.finish())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
