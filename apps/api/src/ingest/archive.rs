//! Archive extraction and the directory-backed raster resolver.
//!
//! Every upload gets its own `TempDir`; the extracted images live there
//! for the duration of the run and vanish when the store drops. Runs
//! never share directories, so concurrent uploads cannot collide.

use std::io::Cursor;
use std::path::{Component, Path, PathBuf};
use std::{fs, io};

use image::DynamicImage;
use tempfile::TempDir;
use zip::ZipArchive;

use crate::errors::AppError;
use crate::render::RasterResolver;

/// Lookup-by-name store over a per-run extraction directory.
#[derive(Debug)]
pub struct RasterStore {
    dir: TempDir,
}

impl RasterStore {
    /// Extracts a ZIP archive into a fresh scoped directory.
    ///
    /// Entry paths are validated with `enclosed_name`, so hostile archives
    /// cannot write outside the run directory. Directory entries are
    /// skipped; nested files keep their relative paths so manifests may
    /// reference `subdir/card.png`.
    pub fn extract(zip_bytes: &[u8]) -> Result<Self, AppError> {
        let dir = TempDir::new()
            .map_err(|e| AppError::Archive(format!("failed to create run directory: {e}")))?;
        let mut archive = ZipArchive::new(Cursor::new(zip_bytes))
            .map_err(|e| AppError::Archive(format!("unreadable ZIP archive: {e}")))?;

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| AppError::Archive(format!("corrupt ZIP entry: {e}")))?;
            if entry.is_dir() {
                continue;
            }
            let Some(relative) = entry.enclosed_name() else {
                tracing::warn!(name = %entry.name(), "skipping ZIP entry with unsafe path");
                continue;
            };

            let target = dir.path().join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| AppError::Archive(format!("failed to extract archive: {e}")))?;
            }
            let mut out = fs::File::create(&target)
                .map_err(|e| AppError::Archive(format!("failed to extract archive: {e}")))?;
            io::copy(&mut entry, &mut out)
                .map_err(|e| AppError::Archive(format!("failed to extract archive: {e}")))?;
        }

        Ok(RasterStore { dir })
    }
}

impl RasterResolver for RasterStore {
    /// Reads and decodes the image for `identifier`, or `None` on any
    /// failure (absent file, traversal attempt, undecodable bytes). The
    /// compositor counts misses; nothing is raised here.
    fn resolve(&self, identifier: &str) -> Option<DynamicImage> {
        let relative = safe_relative(identifier)?;
        let bytes = fs::read(self.dir.path().join(relative)).ok()?;
        image::load_from_memory(&bytes).ok()
    }
}

/// Accepts only plain relative paths: no root, no drive prefix, no `..`.
fn safe_relative(identifier: &str) -> Option<PathBuf> {
    let path = Path::new(identifier);
    if path.as_os_str().is_empty() {
        return None;
    }
    path.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| path.to_path_buf())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn png_bytes(w: u32, h: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(rgb)));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_and_resolve_flat_entry() {
        let png = png_bytes(6, 8, [120, 0, 0]);
        let store = RasterStore::extract(&zip_with(&[("a.png", &png)])).unwrap();
        let raster = store.resolve("a.png").expect("a.png should resolve");
        assert_eq!(raster.width(), 6);
        assert_eq!(raster.height(), 8);
    }

    #[test]
    fn test_resolve_nested_entry_by_relative_path() {
        let png = png_bytes(4, 4, [0, 120, 0]);
        let store = RasterStore::extract(&zip_with(&[("cards/b.png", &png)])).unwrap();
        assert!(store.resolve("cards/b.png").is_some());
        assert!(store.resolve("b.png").is_none());
    }

    #[test]
    fn test_missing_identifier_is_a_miss_not_an_error() {
        let store = RasterStore::extract(&zip_with(&[])).unwrap();
        assert!(store.resolve("nope.png").is_none());
    }

    #[test]
    fn test_undecodable_bytes_are_a_miss() {
        let store =
            RasterStore::extract(&zip_with(&[("junk.png", b"not an image" as &[u8])])).unwrap();
        assert!(store.resolve("junk.png").is_none());
    }

    #[test]
    fn test_traversal_identifiers_never_resolve() {
        let store = RasterStore::extract(&zip_with(&[])).unwrap();
        assert!(store.resolve("../etc/passwd").is_none());
        assert!(store.resolve("/etc/passwd").is_none());
        assert!(store.resolve("a/../../b.png").is_none());
        assert!(store.resolve("").is_none());
    }

    #[test]
    fn test_garbage_archive_is_rejected() {
        let err = RasterStore::extract(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, AppError::Archive(_)));
    }
}
