//! Document use case.
//!
//! `DocumentUseCase` drives one template through its whole life: upload and
//! field extraction, question enrichment, answer collection and generation
//! of the filled document. It owns no state of its own beyond the
//! [`SessionStore`] handed to it by the composition root.
//!
//! Oracle calls are always made against a snapshot of the session, with no
//! session lock held. Their results are committed afterwards through
//! [`SessionStore::update`], so a slow or failing oracle never blocks other
//! requests and never touches answers already saved.

use crate::session::SessionStore;
use docfill_core::error::{DocfillError, Result};
use docfill_core::field::{
    ExtractionOutcome, ExtractionSource, PlaceholderExtractor, default_question,
};
use docfill_core::fill::{SubstitutionEngine, TemplateDocument};
use docfill_core::oracle::{FieldOracle, OracleError};
use docfill_core::session::{self as session_state, NextQuestion, Progress, Session};
use docfill_infrastructure::docx::DocxPackage;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Returns true if `filename` has a `.docx` extension, ignoring case.
pub fn is_docx_filename(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".docx")
}

/// Result of [`DocumentUseCase::upload`].
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Created {
        session: Session,
        source: ExtractionSource,
    },
    /// The template parsed but contains nothing to fill; no session is created
    NoPlaceholders,
}

/// Result of [`DocumentUseCase::submit_answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReceipt {
    pub field: String,
    /// Counters read from the committed session
    pub progress: Progress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    Oracle,
    Generated,
}

/// Result of [`DocumentUseCase::enrich_questions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionEnrichment {
    pub questions: HashMap<String, String>,
    pub source: QuestionSource,
    pub message: String,
}

impl QuestionEnrichment {
    pub fn count(&self) -> usize {
        self.questions.len()
    }
}

/// A filled `.docx`.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    pub replacements: usize,
}

pub struct DocumentUseCase {
    /// Shared session store
    store: Arc<SessionStore>,
    /// Strategy for finding fields in uploads
    extractor: PlaceholderExtractor,
    /// Oracle for field detection and placeholder resolution
    detection_oracle: Option<Arc<dyn FieldOracle>>,
    /// Oracle for question phrasing and type classification
    question_oracle: Option<Arc<dyn FieldOracle>>,
    engine: SubstitutionEngine,
}

impl DocumentUseCase {
    pub fn new(
        store: Arc<SessionStore>,
        extractor: PlaceholderExtractor,
        detection_oracle: Option<Arc<dyn FieldOracle>>,
        question_oracle: Option<Arc<dyn FieldOracle>>,
    ) -> Self {
        let engine = SubstitutionEngine::new(detection_oracle.clone());
        Self {
            store,
            extractor,
            detection_oracle,
            question_oracle,
            engine,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Opens an uploaded template, extracts its fields and creates a session.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a non-`.docx` filename, an empty body or a
    ///   container that cannot be read
    /// - `QuotaExhausted`, `OracleTimeout` or `ExtractionFailed` when
    ///   extraction fails with nothing to fall back to
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadOutcome> {
        if !is_docx_filename(filename) {
            return Err(DocfillError::invalid_input("Only .docx files are supported."));
        }
        if bytes.is_empty() {
            return Err(DocfillError::invalid_input("Uploaded file is empty."));
        }

        let package = DocxPackage::open(bytes)?;
        let text = package.plain_text();
        let outcome = self
            .extractor
            .extract(&text, self.detection_oracle.as_deref())
            .await?;

        let (fields, source) = match outcome {
            ExtractionOutcome::Fields { fields, source } => (fields, source),
            ExtractionOutcome::NoPlaceholders => {
                tracing::info!(filename, "Upload contains no placeholders");
                return Ok(UploadOutcome::NoPlaceholders);
            }
        };

        let session = self.store.create(package.into_bytes(), fields).await;
        tracing::info!(
            session_id = session.id(),
            fields = session.fields().len(),
            source = ?source,
            "Session created"
        );
        Ok(UploadOutcome::Created { session, source })
    }

    /// Current snapshot of a session.
    pub async fn status(&self, session_id: &str) -> Result<Session> {
        self.store.get(session_id).await
    }

    pub async fn next_question(&self, session_id: &str) -> Result<NextQuestion> {
        let session = self.store.get(session_id).await?;
        Ok(session_state::next_question(&session))
    }

    /// Records an answer and returns the progress after the commit.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when `field` or `answer` is empty. Whitespace-only
    ///   answers are stored as given.
    /// - `NotFound` for an unknown session, or a field that is not exactly
    ///   one of the session's identifiers
    pub async fn submit_answer(
        &self,
        session_id: &str,
        field: &str,
        answer: &str,
    ) -> Result<AnswerReceipt> {
        if field.is_empty() || answer.is_empty() {
            return Err(DocfillError::invalid_input(
                "Invalid request body. Required: field, answer",
            ));
        }

        let progress = self
            .store
            .update(session_id, |session| {
                session.record_answer(field, answer)?;
                Ok(session_state::progress(session))
            })
            .await?;

        tracing::debug!(
            session_id,
            field,
            answered = progress.answered,
            total = progress.total,
            "Answer recorded"
        );
        Ok(AnswerReceipt {
            field: field.to_string(),
            progress,
        })
    }

    /// Asks the question oracle to phrase a question for every field.
    ///
    /// Oracle failures are not errors here: the generated questions are
    /// returned instead and the reason is reported in `message`. Nothing is
    /// written to the session in that case, so `next_question` keeps
    /// flagging the questions as not AI-phrased.
    ///
    /// # Errors
    ///
    /// `NotFound` if the session does not exist, before or after the oracle call.
    pub async fn enrich_questions(&self, session_id: &str) -> Result<QuestionEnrichment> {
        let fields = self.store.get(session_id).await?.fields().to_vec();

        let guidance = match &self.question_oracle {
            Some(oracle) => oracle.classify_and_phrase(&fields).await,
            None => Err(OracleError::NotConfigured(
                "no question oracle is configured".to_string(),
            )),
        };

        match guidance {
            Ok(guidance) => {
                let questions = self
                    .store
                    .update(session_id, |session| {
                        let applied = session.apply_guidance(&guidance);
                        Ok(applied
                            .into_iter()
                            .filter_map(|field| {
                                let question = session.questions().get(&field)?.clone();
                                Some((field, question))
                            })
                            .collect::<HashMap<_, _>>())
                    })
                    .await?;

                tracing::info!(
                    session_id,
                    count = questions.len(),
                    "Questions enriched"
                );
                Ok(QuestionEnrichment {
                    questions,
                    source: QuestionSource::Oracle,
                    message: "AI questions generated successfully.".to_string(),
                })
            }
            Err(err) => {
                tracing::warn!(
                    session_id,
                    error = %err,
                    "Question enrichment failed, using generated questions"
                );
                let reason = if err.is_quota_exhausted() {
                    "AI quota exhausted, please try again later".to_string()
                } else {
                    err.to_string()
                };
                let questions = fields
                    .iter()
                    .map(|field| (field.clone(), default_question(field)))
                    .collect();
                Ok(QuestionEnrichment {
                    questions,
                    source: QuestionSource::Generated,
                    message: format!("{reason}. Using generated questions."),
                })
            }
        }
    }

    /// Fills the session's template with its answers.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown session
    /// - `IncompleteState` while any field is unanswered
    /// - `GenerationFailed` when the document cannot be produced
    pub async fn generate(&self, session_id: &str) -> Result<GeneratedDocument> {
        let session = self.store.get(session_id).await?;
        session_state::ensure_complete(&session)?;

        let package = DocxPackage::open(session.original_document().to_vec())
            .map_err(|e| DocfillError::generation_failed(e.to_string()))?;
        let rendered = self.engine.fill(&package, session.answers()).await?;

        tracing::info!(
            session_id,
            replacements = rendered.replacements,
            size = rendered.bytes.len(),
            "Document generated"
        );
        Ok(GeneratedDocument {
            bytes: rendered.bytes,
            replacements: rendered.replacements,
        })
    }

    pub async fn delete(&self, session_id: &str) -> Result<()> {
        self.store.delete(session_id).await?;
        tracing::info!(session_id, "Session deleted");
        Ok(())
    }
}
