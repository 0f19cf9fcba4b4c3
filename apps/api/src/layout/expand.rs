//! Item expansion: one manifest row per card design, one sequence entry
//! per physical copy.
//!
//! Order matters twice: rows expand in manifest order, and the flat
//! sequence is what the grid packer slices into pages, so the printed
//! sheets follow the manifest top to bottom.

use crate::layout::LayoutError;

/// One manifest row: a card image identifier and how many copies to print.
///
/// `copies` is signed because the manifest is caller-supplied; negative
/// counts are a reported error, not an arithmetic accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintItem {
    pub identifier: String,
    pub copies: i64,
}

/// Expands items into the flat, order-preserving sequence of identifiers.
///
/// Each identifier appears exactly `copies` times; `copies == 0`
/// contributes nothing. The whole manifest is validated before any entry
/// is emitted, so a negative count fails the run eagerly.
pub fn expand(items: &[PrintItem]) -> Result<Vec<String>, LayoutError> {
    for item in items {
        if item.copies < 0 {
            return Err(LayoutError::InvalidCopyCount {
                identifier: item.identifier.clone(),
                copies: item.copies,
            });
        }
    }

    let total: usize = items.iter().map(|i| i.copies as usize).sum();
    let mut flat = Vec::with_capacity(total);
    for item in items {
        for _ in 0..item.copies {
            flat.push(item.identifier.clone());
        }
    }
    Ok(flat)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
