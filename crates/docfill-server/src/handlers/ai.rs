//! POST /api/session/:id/ai/questions

use crate::app::AppState;
use crate::dto::GenerateQuestionsResponse;
use crate::error::ApiError;
use axum::Json;
use axum::extract::{Path, State};
use docfill_application::QuestionSource;

/// Phrases questions for every field. Oracle trouble is reported in
/// `message`, never as an error status.
pub async fn generate_questions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GenerateQuestionsResponse>, ApiError> {
    let enrichment = state.documents.enrich_questions(&id).await?;
    let source = match enrichment.source {
        QuestionSource::Oracle => "oracle",
        QuestionSource::Generated => "generated",
    };

    Ok(Json(GenerateQuestionsResponse {
        count: enrichment.count(),
        questions: enrichment.questions,
        message: enrichment.message,
        source: source.to_string(),
    }))
}
