//! Session handlers.
//!
//! GET    /api/session/:id          session status
//! DELETE /api/session/:id          drop a session
//! GET    /api/session/:id/next     next unanswered question
//! POST   /api/session/:id/answers  record one answer

use crate::app::AppState;
use crate::dto::{AnswerRequest, AnswerResponse, QuestionResponse, SessionStatusResponse};
use crate::error::ApiError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let session = state.documents.status(&id).await?;
    Ok(Json(SessionStatusResponse::from(&session)))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.documents.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn next_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let next = state.documents.next_question(&id).await?;
    Ok(Json(QuestionResponse::from(next)))
}

pub async fn submit_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let Json(request) = body.map_err(ApiError::from_json_rejection)?;
    let receipt = state
        .documents
        .submit_answer(&id, &request.field, &request.answer)
        .await?;

    Ok(Json(AnswerResponse {
        message: "Answer saved successfully.".to_string(),
        field: receipt.field,
        progress: receipt.progress.answered,
        total: receipt.progress.total,
    }))
}
