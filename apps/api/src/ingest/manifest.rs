//! Manifest parsing: the uploaded CSV of `{filename, copies}` rows.
//!
//! Only these two columns matter; extra columns are ignored. Malformed
//! rows (missing columns, non-integer copies) are ingestion errors and
//! fail the upload with a 400. Negative copy counts parse successfully
//! here and are rejected by the layout core's expansion step, so the
//! error is reported as the structural `InvalidCopyCount` it is.

use serde::Deserialize;

use crate::errors::AppError;
use crate::layout::PrintItem;

#[derive(Debug, Deserialize)]
struct ManifestRow {
    filename: String,
    copies: i64,
}

/// Parses the manifest CSV into ordered print items.
///
/// Row order is preserved; it defines the order of tiles on the sheets.
pub fn parse_manifest(bytes: &[u8]) -> Result<Vec<PrintItem>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut items = Vec::new();
    for (line, record) in reader.deserialize::<ManifestRow>().enumerate() {
        let row = record.map_err(|e| {
            AppError::Manifest(format!("row {}: {e}", line + 1))
        })?;
        items.push(PrintItem {
            identifier: row.filename,
            copies: row.copies,
        });
    }
    Ok(items)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
