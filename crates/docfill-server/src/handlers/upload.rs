//! POST /api/upload

use crate::app::AppState;
use crate::dto::UploadResponse;
use crate::error::ApiError;
use axum::Json;
use axum::extract::{Multipart, State};
use docfill_application::{UploadOutcome, is_docx_filename};

/// Multipart field names accepted for the template, in order of preference.
const FILE_FIELDS: [&str; 2] = ["document", "file"];

struct UploadedFile {
    field: String,
    filename: String,
    bytes: Vec<u8>,
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart)?
    {
        let name = field.name().unwrap_or_default().to_string();
        if !FILE_FIELDS.contains(&name.as_str()) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(ApiError::from_multipart)?;
        uploads.push(UploadedFile {
            field: name,
            filename,
            bytes: bytes.to_vec(),
        });
    }

    let upload = FILE_FIELDS
        .iter()
        .find_map(|wanted| {
            let index = uploads.iter().position(|u| u.field == *wanted)?;
            Some(uploads.swap_remove(index))
        })
        .ok_or_else(ApiError::missing_file)?;

    if !is_docx_filename(&upload.filename) {
        return Err(ApiError::invalid_file_type());
    }

    tracing::debug!(
        filename = %upload.filename,
        size = upload.bytes.len(),
        "Received upload"
    );
    match state
        .documents
        .upload(&upload.filename, upload.bytes)
        .await?
    {
        UploadOutcome::Created { session, .. } => Ok(Json(UploadResponse {
            session_id: session.id().to_string(),
            fields: session.fields().to_vec(),
            message: "Document uploaded successfully.".to_string(),
        })),
        UploadOutcome::NoPlaceholders => Err(ApiError::no_fields_found()),
    }
}
