use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::{header, HeaderName};
use axum::response::IntoResponse;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::ingest::archive::RasterStore;
use crate::ingest::manifest::parse_manifest;
use crate::layout::{expand, pack, LayoutError, PageLayout, PhysicalSize, PixelSize};
use crate::state::AppState;

const UNRESOLVED_TILES_HEADER: HeaderName = HeaderName::from_static("x-unresolved-tiles");

/// The multipart fields of one upload: the two required files plus the
/// optional card-size overrides (millimeters, as form text).
#[derive(Default)]
struct SheetUpload {
    csv: Option<Bytes>,
    zip: Option<Bytes>,
    card_width: Option<f64>,
    card_height: Option<f64>,
}

/// POST /api/v1/sheets
///
/// Accepts a CSV manifest (`filename,copies`) and a ZIP archive of card
/// images, lays the cards out on centered grids, and returns the
/// assembled multi-page PDF. Tiles whose image is missing from the
/// archive are left blank; their count comes back in the
/// `x-unresolved-tiles` header.
pub async fn handle_generate_sheets(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let upload = read_upload(multipart).await?;
    let (Some(csv), Some(zip)) = (upload.csv, upload.zip) else {
        return Err(AppError::Validation("Missing CSV or ZIP file".to_string()));
    };

    let config = &state.config;
    let dpi = config.dpi;
    let card = PhysicalSize {
        width_mm: upload.card_width.unwrap_or(config.card_width_mm),
        height_mm: upload.card_height.unwrap_or(config.card_height_mm),
    };

    // Layout constants are derived once per run; bad geometry fails here,
    // before anything is extracted or rendered.
    let tile = PixelSize::from_mm(card, dpi)?;
    let page = PixelSize::from_inches(config.page_width_in, config.page_height_in, dpi)?;
    let layout = PageLayout::new(page, tile, config.grid)?;

    let items = parse_manifest(&csv)?;
    let flat = expand(&items)?;
    let pages = pack(flat, layout.grid);
    if pages.is_empty() {
        return Err(AppError::Layout(LayoutError::EmptyDocument));
    }

    let store = tokio::task::spawn_blocking(move || RasterStore::extract(&zip))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let document =
        crate::render::render_document(pages, Arc::new(store), layout, dpi).await?;

    info!(
        pages = document.page_count,
        unresolved = document.unresolved_tiles,
        card_width_mm = card.width_mm,
        card_height_mm = card.height_mm,
        "sheet document assembled"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"final_cards.pdf\"".to_string(),
            ),
            (
                UNRESOLVED_TILES_HEADER,
                document.unresolved_tiles.to_string(),
            ),
        ],
        Bytes::from(document.pdf),
    ))
}

/// Walks the multipart stream and collects the recognized fields.
/// Unknown fields are ignored rather than rejected.
async fn read_upload(mut multipart: Multipart) -> Result<SheetUpload, AppError> {
    let mut upload = SheetUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        // Copy the name out: the field is consumed when its body is read.
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("csv") => {
                upload.csv = Some(field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("failed to read csv part: {e}"))
                })?);
            }
            Some("zip") => {
                upload.zip = Some(field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("failed to read zip part: {e}"))
                })?);
            }
            Some("card_width") => {
                upload.card_width = Some(parse_mm_field("card_width", field).await?);
            }
            Some("card_height") => {
                upload.card_height = Some(parse_mm_field("card_height", field).await?);
            }
            _ => {}
        }
    }

    Ok(upload)
}

async fn parse_mm_field(
    name: &'static str,
    field: axum::extract::multipart::Field<'_>,
) -> Result<f64, AppError> {
    let text = field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("failed to read {name}: {e}")))?;
    text.trim()
        .parse::<f64>()
        .map_err(|_| AppError::Validation(format!("{name} must be a number, got '{text}'")))
}
