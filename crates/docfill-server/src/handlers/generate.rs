//! POST /api/session/:id/generate

use crate::app::AppState;
use crate::error::ApiError;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use docfill_infrastructure::docx::DOCX_CONTENT_TYPE;

pub const DOWNLOAD_DISPOSITION: &str = "attachment; filename=filled_document.docx";

pub async fn generate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state.documents.generate(&id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, DOWNLOAD_DISPOSITION),
        ],
        document.bytes,
    ))
}
