//! Page compositing: resolves each tile's identifier to a decoded raster
//! and pastes it onto a white page at its computed origin.
//!
//! A tile whose raster cannot be resolved is skipped, leaving a blank
//! slot. The skip is counted per page so the run can report how many
//! tiles went unresolved, but it never fails the page.

use image::imageops::{overlay, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

use crate::layout::grid::slot_origin;
use crate::layout::{Page, PageLayout};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Supplies decoded rasters by identifier. Backed by the per-run
/// extraction directory in production; tests substitute in-memory maps.
///
/// `resolve` returning `None` means the tile is skipped; it is the only
/// failure mode, so decode errors and missing files look the same here.
pub trait RasterResolver: Send + Sync {
    fn resolve(&self, identifier: &str) -> Option<DynamicImage>;
}

/// One fully rendered page, owned by the assembler until serialization.
pub struct RenderedPage {
    pub index: usize,
    pub pixels: RgbImage,
    /// Tiles on this page whose raster could not be resolved.
    pub unresolved: u32,
}

/// Renders a single page: white background, then each tile in slot order.
///
/// Resolved rasters are stretched to exactly the tile size (no aspect
/// preservation) and composited at the slot origin, overwriting whatever
/// is underneath. Negative origins clip against the page bounds.
pub fn render_page(
    page: &Page,
    resolver: &dyn RasterResolver,
    layout: &PageLayout,
) -> RenderedPage {
    let mut pixels = RgbImage::from_pixel(layout.page.width, layout.page.height, BACKGROUND);
    let mut unresolved = 0u32;

    for tile in &page.tiles {
        let Some(raster) = resolver.resolve(&tile.identifier) else {
            tracing::debug!(
                identifier = %tile.identifier,
                page = page.index,
                slot = tile.slot,
                "raster not resolved; leaving slot blank"
            );
            unresolved += 1;
            continue;
        };

        let card = raster
            .resize_exact(layout.tile.width, layout.tile.height, FilterType::Lanczos3)
            .to_rgb8();
        let (x, y) = slot_origin(tile.slot, layout);
        overlay(&mut pixels, &card, x, y);
    }

    RenderedPage {
        index: page.index,
        pixels,
        unresolved,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::units::{GridSpec, PixelSize};
    use crate::layout::Tile;
    use std::collections::HashMap;

    /// Resolver over a fixed identifier → solid-color raster map.
    struct MapResolver(HashMap<String, DynamicImage>);

    impl MapResolver {
        fn empty() -> Self {
            MapResolver(HashMap::new())
        }

        fn with_solid(entries: &[(&str, [u8; 3], u32, u32)]) -> Self {
            let map = entries
                .iter()
                .map(|(id, rgb, w, h)| {
                    let img = RgbImage::from_pixel(*w, *h, Rgb(*rgb));
                    (id.to_string(), DynamicImage::ImageRgb8(img))
                })
                .collect();
            MapResolver(map)
        }
    }

    impl RasterResolver for MapResolver {
        fn resolve(&self, identifier: &str) -> Option<DynamicImage> {
            self.0.get(identifier).cloned()
        }
    }

    fn small_layout() -> PageLayout {
        // 100×100 page, 20×30 tiles on a 3×3 grid: margins (100−60)/2 = 20
        // and (100−90)/2 = 5.
        PageLayout::new(
            PixelSize {
                width: 100,
                height: 100,
            },
            PixelSize {
                width: 20,
                height: 30,
            },
            GridSpec {
                columns: 3,
                rows: 3,
            },
        )
        .unwrap()
    }

    fn page_with(identifiers: &[&str]) -> Page {
        Page {
            index: 0,
            tiles: identifiers
                .iter()
                .enumerate()
                .map(|(j, id)| Tile {
                    identifier: id.to_string(),
                    page_index: 0,
                    slot: j as u32,
                })
                .collect(),
        }
    }

    #[test]
    fn test_all_misses_render_a_blank_white_page() {
        let layout = small_layout();
        let page = page_with(&["a.png", "b.png", "c.png"]);
        let rendered = render_page(&page, &MapResolver::empty(), &layout);

        assert_eq!(rendered.unresolved, 3);
        assert_eq!(rendered.pixels.dimensions(), (100, 100));
        assert!(rendered.pixels.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn test_resolved_tile_is_stretched_and_placed_at_slot_origin() {
        let layout = small_layout();
        let page = page_with(&["red.png"]);
        // Source raster is 5×5; it must be stretched to the 20×30 tile.
        let resolver = MapResolver::with_solid(&[("red.png", [200, 0, 0], 5, 5)]);
        let rendered = render_page(&page, &resolver, &layout);

        assert_eq!(rendered.unresolved, 0);
        // Slot 0 origin is (20, 5); the full 20×30 footprint is tile-colored.
        assert_eq!(*rendered.pixels.get_pixel(20, 5), Rgb([200, 0, 0]));
        assert_eq!(*rendered.pixels.get_pixel(39, 34), Rgb([200, 0, 0]));
        // Just outside the footprint stays background.
        assert_eq!(*rendered.pixels.get_pixel(19, 5), BACKGROUND);
        assert_eq!(*rendered.pixels.get_pixel(40, 5), BACKGROUND);
        assert_eq!(*rendered.pixels.get_pixel(20, 35), BACKGROUND);
    }

    #[test]
    fn test_miss_between_hits_leaves_that_slot_blank() {
        let layout = small_layout();
        let page = page_with(&["a.png", "missing.png", "a.png"]);
        let resolver = MapResolver::with_solid(&[("a.png", [0, 0, 128], 20, 30)]);
        let rendered = render_page(&page, &resolver, &layout);

        assert_eq!(rendered.unresolved, 1);
        // Slots 0 and 2 placed, slot 1 (origin (40, 5)) blank.
        assert_eq!(*rendered.pixels.get_pixel(20, 5), Rgb([0, 0, 128]));
        assert_eq!(*rendered.pixels.get_pixel(60, 5), Rgb([0, 0, 128]));
        assert_eq!(*rendered.pixels.get_pixel(45, 10), BACKGROUND);
    }

    #[test]
    fn test_negative_origin_clips_instead_of_panicking() {
        // 40×40 page with 3×3 of 20×20 tiles overflows: margins are −10.
        let layout = PageLayout::new(
            PixelSize {
                width: 40,
                height: 40,
            },
            PixelSize {
                width: 20,
                height: 20,
            },
            GridSpec {
                columns: 3,
                rows: 3,
            },
        )
        .unwrap();
        let page = page_with(&["g.png"]);
        let resolver = MapResolver::with_solid(&[("g.png", [0, 100, 0], 20, 20)]);
        let rendered = render_page(&page, &resolver, &layout);

        // Tile origin is (−10, −10); the visible quarter is the tile color.
        assert_eq!(*rendered.pixels.get_pixel(0, 0), Rgb([0, 100, 0]));
        assert_eq!(*rendered.pixels.get_pixel(9, 9), Rgb([0, 100, 0]));
        assert_eq!(*rendered.pixels.get_pixel(10, 10), BACKGROUND);
    }
}
