// Rendering pipeline: compositor (page rasters) + assembler (PDF bytes).
// Compositing is CPU-bound and runs inside tokio::task::spawn_blocking,
// one task per page; results are gathered back into strict index order
// before assembly, whatever the completion order.

pub mod assembler;
pub mod compositor;

pub use compositor::{render_page, RasterResolver, RenderedPage};

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinSet;

use crate::layout::{LayoutError, Page, PageLayout};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("page render task failed: {0}")]
    Task(String),
}

/// The finished artifact handed back to the HTTP layer.
#[derive(Debug)]
pub struct SheetDocument {
    pub pdf: Vec<u8>,
    pub page_count: usize,
    /// Total tiles across the run whose raster never resolved. A soft
    /// failure: the document is still produced, with blank slots.
    pub unresolved_tiles: u64,
}

/// Renders every page concurrently and assembles the ordered result.
///
/// Each page depends only on its own descriptor, the shared immutable
/// layout, and the read-only resolver, so pages fan out freely; the
/// output page order always equals the input page index order.
pub async fn render_document(
    pages: Vec<Page>,
    resolver: Arc<dyn RasterResolver>,
    layout: PageLayout,
    dpi: f64,
) -> Result<SheetDocument, RenderError> {
    let page_count = pages.len();

    let mut tasks = JoinSet::new();
    for page in pages {
        let resolver = Arc::clone(&resolver);
        tasks.spawn_blocking(move || render_page(&page, resolver.as_ref(), &layout));
    }

    let mut by_index: Vec<Option<RenderedPage>> = (0..page_count).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let rendered = joined.map_err(|e| RenderError::Task(e.to_string()))?;
        let index = rendered.index;
        by_index[index] = Some(rendered);
    }

    // Every index was spawned exactly once, so every slot must be filled.
    let ordered: Vec<RenderedPage> = by_index.into_iter().flatten().collect();
    if ordered.len() != page_count {
        return Err(RenderError::Task("a page render went missing".to_string()));
    }

    let unresolved_tiles: u64 = ordered.iter().map(|p| p.unresolved as u64).sum();
    if unresolved_tiles > 0 {
        tracing::warn!(
            unresolved_tiles,
            page_count,
            "some tiles had no matching raster; slots left blank"
        );
    }

    let pdf = assembler::assemble(&ordered, dpi)?;
    Ok(SheetDocument {
        pdf,
        page_count,
        unresolved_tiles,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::units::{GridSpec, PixelSize};
    use crate::layout::{expand, pack, PrintItem};
    use image::{DynamicImage, Rgb, RgbImage};

    /// Resolves only the identifiers it was given, as solid 4×4 rasters.
    struct KnownIds(Vec<String>);

    impl RasterResolver for KnownIds {
        fn resolve(&self, identifier: &str) -> Option<DynamicImage> {
            self.0.iter().any(|id| id == identifier).then(|| {
                DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([10, 20, 30])))
            })
        }
    }

    fn small_layout() -> PageLayout {
        PageLayout::new(
            PixelSize {
                width: 120,
                height: 150,
            },
            PixelSize {
                width: 30,
                height: 40,
            },
            GridSpec {
                columns: 3,
                rows: 3,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_two_resolved_one_blank_single_page() {
        // Manifest [("a.png", 2), ("b.png", 1)] on a 3×3 grid: one page,
        // slots 0–2, with b.png unresolved.
        let items = vec![
            PrintItem {
                identifier: "a.png".to_string(),
                copies: 2,
            },
            PrintItem {
                identifier: "b.png".to_string(),
                copies: 1,
            },
        ];
        let flat = expand(&items).unwrap();
        assert_eq!(flat, vec!["a.png", "a.png", "b.png"]);

        let layout = small_layout();
        let pages = pack(flat, layout.grid);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].tiles.len(), 3);

        let resolver = Arc::new(KnownIds(vec!["a.png".to_string()]));
        let doc = render_document(pages, resolver, layout, 300.0)
            .await
            .unwrap();

        assert_eq!(doc.page_count, 1);
        assert_eq!(doc.unresolved_tiles, 1);
        assert!(doc.pdf.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&doc.pdf);
        assert!(text.contains("/Count 1"));
    }

    #[tokio::test]
    async fn test_pages_come_back_in_index_order() {
        // 20 copies on a 3×3 grid: 3 pages rendered concurrently.
        let items = vec![PrintItem {
            identifier: "a.png".to_string(),
            copies: 20,
        }];
        let layout = small_layout();
        let pages = pack(expand(&items).unwrap(), layout.grid);
        assert_eq!(pages.len(), 3);

        let resolver = Arc::new(KnownIds(vec!["a.png".to_string()]));
        let doc = render_document(pages, resolver, layout, 300.0)
            .await
            .unwrap();

        assert_eq!(doc.page_count, 3);
        assert_eq!(doc.unresolved_tiles, 0);
        let text = String::from_utf8_lossy(&doc.pdf);
        assert!(text.contains("/Count 3"));
    }

    #[tokio::test]
    async fn test_zero_pages_surface_empty_document() {
        let layout = small_layout();
        let resolver = Arc::new(KnownIds(vec![]));
        let err = render_document(vec![], resolver, layout, 300.0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Layout(LayoutError::EmptyDocument)
        ));
    }
}
