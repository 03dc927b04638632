//! Request and response bodies of the HTTP API.

use docfill_core::session::{self as session_state, FieldPrompt, NextQuestion, Session};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub session_id: String,
    pub fields: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub fields: Vec<String>,
    pub answers: HashMap<String, String>,
    pub questions: HashMap<String, String>,
    pub field_types: HashMap<String, String>,
    pub progress: usize,
    pub total: usize,
    pub is_completed: bool,
}

impl From<&Session> for SessionStatusResponse {
    fn from(session: &Session) -> Self {
        let progress = session_state::progress(session);
        Self {
            session_id: session.id().to_string(),
            fields: session.fields().to_vec(),
            answers: session.answers().clone(),
            questions: session.questions().clone(),
            field_types: session
                .field_types()
                .iter()
                .map(|(field, field_type)| (field.clone(), field_type.to_string()))
                .collect(),
            progress: progress.answered,
            total: progress.total,
            is_completed: progress.is_complete(),
        }
    }
}

/// `done: true` carries empty field, type and question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub field: String,
    pub field_type: String,
    pub question: String,
    #[serde(rename = "isAIPhrased")]
    pub is_ai_phrased: bool,
    pub progress: usize,
    pub total: usize,
    pub done: bool,
}

impl From<NextQuestion> for QuestionResponse {
    fn from(next: NextQuestion) -> Self {
        match next {
            NextQuestion::Ask(FieldPrompt {
                field,
                field_type,
                question,
                is_ai_phrased,
                progress,
            }) => Self {
                field,
                field_type: field_type.to_string(),
                question,
                is_ai_phrased,
                progress: progress.answered,
                total: progress.total,
                done: false,
            },
            NextQuestion::Done(progress) => Self {
                field: String::new(),
                field_type: String::new(),
                question: String::new(),
                is_ai_phrased: false,
                progress: progress.answered,
                total: progress.total,
                done: true,
            },
        }
    }
}

/// Missing keys deserialize as empty strings and are rejected by the use case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerRequest {
    pub field: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub message: String,
    pub field: String,
    pub progress: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsResponse {
    pub questions: HashMap<String, String>,
    pub count: usize,
    pub message: String,
    /// `oracle` or `generated`
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
