use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::layout::LayoutError;
use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Layout(e) => AppError::Layout(e),
            RenderError::Task(msg) => AppError::Render(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Manifest(msg) => (
                StatusCode::BAD_REQUEST,
                "MANIFEST_ERROR",
                format!("Could not read the CSV manifest: {msg}"),
            ),
            AppError::Archive(msg) => (
                StatusCode::BAD_REQUEST,
                "ARCHIVE_ERROR",
                format!("Could not read the image archive: {msg}"),
            ),
            AppError::Layout(e) => {
                let code = match e {
                    LayoutError::InvalidDimension { .. } => "INVALID_DIMENSION",
                    LayoutError::InvalidCopyCount { .. } => "INVALID_COPY_COUNT",
                    LayoutError::EmptyDocument => "EMPTY_DOCUMENT",
                };
                (StatusCode::UNPROCESSABLE_ENTITY, code, e.to_string())
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "A rendering error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
