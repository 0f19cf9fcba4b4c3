// Layout core: unit conversion, item expansion, grid packing.
// Everything here is pure computation — no I/O, no async. The render
// module consumes these types; the ingest layer produces their inputs.

pub mod expand;
pub mod grid;
pub mod units;

// Re-export the public API consumed by other modules (render, ingest).
pub use expand::{expand, PrintItem};
pub use grid::{pack, slot_origin, Page, Tile};
pub use units::{GridSpec, PageLayout, PhysicalSize, PixelSize};

use thiserror::Error;

/// Structural errors the layout core detects eagerly, before any page is
/// rendered. Missing rasters are deliberately not here — they are a
/// per-tile soft failure counted at render time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("invalid dimension: {name} must be positive (got {value})")]
    InvalidDimension { name: &'static str, value: f64 },

    #[error("invalid copy count for '{identifier}': {copies}")]
    InvalidCopyCount { identifier: String, copies: i64 },

    #[error("manifest expands to zero pages; a document needs at least one")]
    EmptyDocument,
}
