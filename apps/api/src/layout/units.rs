//! Physical-unit conversion and page geometry.
//!
//! All layout math happens in integer pixels at a fixed print resolution.
//! Conversions truncate toward zero (`744.09 px → 744 px`); centering
//! margins use floor division so an overflowing grid produces the same
//! negative margins the literal arithmetic would.

use serde::{Deserialize, Serialize};

use crate::layout::LayoutError;

/// Millimeters per inch, the fixed bridge between card sizes (mm) and
/// print resolution (dots per inch).
pub const MM_PER_INCH: f64 = 25.4;

// ────────────────────────────────────────────────────────────────────────────
// Raw conversions
// ────────────────────────────────────────────────────────────────────────────

/// Converts a length in millimeters to pixels at `dpi`, truncating toward zero.
///
/// Unchecked on purpose: validation happens where a [`PixelSize`] is built,
/// so this stays a pure arithmetic primitive (`mm_to_px(63.0, 300.0) == 744`).
#[inline]
pub fn mm_to_px(length_mm: f64, dpi: f64) -> i64 {
    (length_mm * dpi / MM_PER_INCH) as i64
}

/// Converts a length in inches to pixels at `dpi`, truncating toward zero.
#[inline]
pub fn in_to_px(length_in: f64, dpi: f64) -> i64 {
    (length_in * dpi) as i64
}

// ────────────────────────────────────────────────────────────────────────────
// Sizes
// ────────────────────────────────────────────────────────────────────────────

/// A physical size in millimeters, as read from configuration or the
/// caller's per-request overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

/// An integer pixel size. Both dimensions are strictly positive — the
/// constructors reject geometry that would silently collapse the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    /// Derives a pixel size from a physical size in millimeters.
    ///
    /// Returns `InvalidDimension` if either side or the resolution is
    /// non-positive, or if truncation yields a zero pixel dimension.
    pub fn from_mm(size: PhysicalSize, dpi: f64) -> Result<Self, LayoutError> {
        let width = checked_px("width", mm_to_px(size.width_mm, dpi), size.width_mm, dpi)?;
        let height = checked_px("height", mm_to_px(size.height_mm, dpi), size.height_mm, dpi)?;
        Ok(PixelSize { width, height })
    }

    /// Derives a pixel size from a physical size in inches (used for the
    /// page itself, which configuration specifies as 8.5 × 11 in).
    pub fn from_inches(width_in: f64, height_in: f64, dpi: f64) -> Result<Self, LayoutError> {
        let width = checked_px("width", in_to_px(width_in, dpi), width_in, dpi)?;
        let height = checked_px("height", in_to_px(height_in, dpi), height_in, dpi)?;
        Ok(PixelSize { width, height })
    }
}

fn checked_px(name: &'static str, px: i64, physical: f64, dpi: f64) -> Result<u32, LayoutError> {
    if physical <= 0.0 || dpi <= 0.0 || px <= 0 {
        return Err(LayoutError::InvalidDimension {
            name,
            value: physical,
        });
    }
    u32::try_from(px).map_err(|_| LayoutError::InvalidDimension {
        name,
        value: physical,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Page layout
// ────────────────────────────────────────────────────────────────────────────

/// How many tiles fit across and down a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub columns: u32,
    pub rows: u32,
}

impl GridSpec {
    /// Maximum tiles per page.
    pub fn capacity(&self) -> usize {
        (self.columns as usize) * (self.rows as usize)
    }
}

/// Fixed per-run layout constants: page and tile pixel sizes, the grid,
/// and the margins that center the grid on the page.
///
/// Margins may be negative when the grid overflows the page; they are
/// deliberately not clamped, so oversized tiles clip at the page edge
/// instead of shifting the whole grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub page: PixelSize,
    pub tile: PixelSize,
    pub grid: GridSpec,
    pub margin_x: i64,
    pub margin_y: i64,
}

impl PageLayout {
    /// Computes the layout once per run.
    ///
    /// `margin = (page_dim − grid_count × tile_dim) / 2` with floor
    /// division, per axis.
    pub fn new(page: PixelSize, tile: PixelSize, grid: GridSpec) -> Result<Self, LayoutError> {
        if grid.capacity() == 0 {
            return Err(LayoutError::InvalidDimension {
                name: "grid",
                value: 0.0,
            });
        }
        let margin_x = centered_margin(page.width, grid.columns, tile.width);
        let margin_y = centered_margin(page.height, grid.rows, tile.height);
        Ok(PageLayout {
            page,
            tile,
            grid,
            margin_x,
            margin_y,
        })
    }
}

fn centered_margin(page_dim: u32, count: u32, tile_dim: u32) -> i64 {
    (page_dim as i64 - count as i64 * tile_dim as i64).div_euclid(2)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
