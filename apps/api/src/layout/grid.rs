//! Grid packing: slices the flat identifier sequence into pages and maps
//! every slot to a pixel origin.
//!
//! Fill order is row-major: left to right, top to bottom. The slot → cell
//! → origin mapping is a pair of standalone pure functions so placement
//! can be tested without rendering anything.

use crate::layout::units::{GridSpec, PageLayout};

/// One placed copy of a card on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub identifier: String,
    pub page_index: usize,
    /// Position within the page, `0..capacity`, row-major.
    pub slot: u32,
}

/// A page's worth of tiles, at most `grid.capacity()` of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub tiles: Vec<Tile>,
}

/// Partitions the flat sequence into consecutive page-sized chunks.
///
/// The last page may be partial; it is a fully valid page, never padded.
/// An empty sequence produces zero pages, not one empty page.
pub fn pack(flat: Vec<String>, grid: GridSpec) -> Vec<Page> {
    let capacity = grid.capacity();
    flat.chunks(capacity.max(1))
        .enumerate()
        .map(|(index, chunk)| Page {
            index,
            tiles: chunk
                .iter()
                .enumerate()
                .map(|(j, identifier)| Tile {
                    identifier: identifier.clone(),
                    page_index: index,
                    slot: j as u32,
                })
                .collect(),
        })
        .collect()
}

/// Maps a slot index to its `(row, col)` cell.
#[inline]
pub fn slot_cell(slot: u32, grid: GridSpec) -> (u32, u32) {
    (slot / grid.columns, slot % grid.columns)
}

/// Maps a slot index to the pixel origin of its tile's top-left corner.
///
/// Origins can be negative when the grid overflows the page (negative
/// margins); the compositor clips against the page bounds.
#[inline]
pub fn slot_origin(slot: u32, layout: &PageLayout) -> (i64, i64) {
    let (row, col) = slot_cell(slot, layout.grid);
    let x = layout.margin_x + col as i64 * layout.tile.width as i64;
    let y = layout.margin_y + row as i64 * layout.tile.height as i64;
    (x, y)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
