//! Session domain model.

use crate::error::{DocfillError, Result};
use crate::field::{FieldType, classify_field};
use crate::oracle::FieldGuidance;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One upload's worth of state: the template, its fields and the answers
/// collected so far.
///
/// The field list is fixed at creation. `answers`, `questions` and
/// `field_types` are keyed by field identifier and only ever accept keys
/// drawn from that list; the mutators below enforce it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    id: String,
    /// Raw template bytes, never sent to clients
    #[serde(skip)]
    original_document: Arc<[u8]>,
    fields: Vec<String>,
    field_types: HashMap<String, FieldType>,
    answers: HashMap<String, String>,
    questions: HashMap<String, String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session over `fields`, classifying each with the naming heuristic.
    ///
    /// Duplicate identifiers are dropped, keeping the first occurrence.
    pub fn new(id: impl Into<String>, original_document: Vec<u8>, fields: Vec<String>) -> Self {
        let mut seen = HashSet::new();
        let fields: Vec<String> = fields
            .into_iter()
            .filter(|field| seen.insert(field.clone()))
            .collect();

        let field_types = fields
            .iter()
            .map(|field| (field.clone(), classify_field(field)))
            .collect();

        let now = Utc::now();
        Self {
            id: id.into(),
            original_document: Arc::from(original_document),
            fields,
            field_types,
            answers: HashMap::new(),
            questions: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn original_document(&self) -> &[u8] {
        &self.original_document
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn field_types(&self) -> &HashMap<String, FieldType> {
        &self.field_types
    }

    pub fn answers(&self) -> &HashMap<String, String> {
        &self.answers
    }

    pub fn questions(&self) -> &HashMap<String, String> {
        &self.questions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if `field` is one of this session's identifiers (exact match).
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Input type of a field; text for unknown identifiers.
    pub fn field_type(&self, field: &str) -> FieldType {
        self.field_types.get(field).copied().unwrap_or_default()
    }

    /// Stores an answer, overwriting any previous one.
    ///
    /// # Errors
    ///
    /// `NotFound` (entity `Field`) if `field` is not exactly one of the
    /// session's identifiers. The session is left untouched in that case.
    pub fn record_answer(&mut self, field: &str, value: impl Into<String>) -> Result<()> {
        if !self.has_field(field) {
            return Err(DocfillError::field_not_found(field));
        }
        self.answers.insert(field.to_string(), value.into());
        Ok(())
    }

    /// Stores a phrased question for a known field. Returns false for unknown fields.
    pub fn set_question(&mut self, field: &str, question: impl Into<String>) -> bool {
        if !self.has_field(field) {
            return false;
        }
        self.questions.insert(field.to_string(), question.into());
        true
    }

    /// Overrides the inferred input type of a known field. Returns false for unknown fields.
    pub fn set_field_type(&mut self, field: &str, field_type: FieldType) -> bool {
        if !self.has_field(field) {
            return false;
        }
        self.field_types.insert(field.to_string(), field_type);
        true
    }

    /// Applies oracle guidance, ignoring entries for unknown fields and blank questions.
    ///
    /// Returns the fields whose question was stored, in session order.
    pub fn apply_guidance(&mut self, guidance: &HashMap<String, FieldGuidance>) -> Vec<String> {
        let mut applied = Vec::new();
        for field in self.fields.clone() {
            let Some(entry) = guidance.get(&field) else {
                continue;
            };
            if let Some(field_type) = entry.field_type {
                self.field_types.insert(field.clone(), field_type);
            }
            let question = entry.question.trim();
            if !question.is_empty() {
                self.questions.insert(field.clone(), question.to_string());
                applied.push(field);
            }
        }
        applied
    }

    /// Refreshes `updated_at`. Called by the store after every committed mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
