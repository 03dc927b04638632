//! Deterministic, in-process oracle.
//!
//! Recognises the three placeholder shapes of typical templates without any
//! network call:
//!
//! - `{{token}}`
//! - `[Field Name]`, skipping structural references such as `[1]`, `[a]`,
//!   `[iv]` and `[Section 1(d)]`
//! - `$[_____]` blanks followed by a naming clause like `(the "Purchase Amount")`
//!
//! Blanks without a naming clause cannot be named and are skipped.

use async_trait::async_trait;
use docfill_core::field::{
    FieldType, classify_field, default_question, double_brace_pattern, humanize_field_name,
    normalize_field_name,
};
use docfill_core::fill::candidate_spellings;
use docfill_core::oracle::{FieldGuidance, FieldOracle, OracleError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]\n]+)\]").expect("bracket pattern is a valid regex"));

static NAMED_BLANK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\$?\[_+\])\s*\(\s*the\s+["“]([^"”]+)["”]\s*\)"#)
        .expect("named blank pattern is a valid regex")
});

static ROMAN_NUMERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^m{0,3}(cm|cd|d?c{0,3})(xc|xl|l?x{0,3})(ix|iv|v?i{0,3})$")
        .expect("roman numeral pattern is a valid regex")
});

/// Returns true for bracket contents that are references, not fields.
fn is_structural_reference(inner: &str) -> bool {
    let inner = inner.trim();
    if inner.chars().all(|c| c == '_' || c.is_whitespace()) {
        return true;
    }
    if !inner.chars().any(|c| c.is_alphabetic()) {
        return true;
    }
    if inner.chars().count() == 1 {
        return true;
    }
    if ROMAN_NUMERAL.is_match(inner) {
        return true;
    }
    inner.to_lowercase().starts_with("section")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineOracle;

impl OfflineOracle {
    pub fn new() -> Self {
        Self
    }

    fn phrase(field: &str) -> FieldGuidance {
        let field_type = classify_field(field);
        let question = match field_type {
            FieldType::Text => default_question(field),
            FieldType::Number => format!(
                "What is the {}? Please enter a number.",
                humanize_field_name(field)
            ),
            FieldType::Date => format!(
                "What is the {}? Please enter a date.",
                humanize_field_name(field)
            ),
        };
        FieldGuidance {
            question,
            field_type: Some(field_type),
        }
    }

    /// First placeholder literal in `text` that stands for `field`.
    fn locate(text: &str, field: &str) -> Option<String> {
        if let Some(spelling) = candidate_spellings(field)
            .into_iter()
            .find(|spelling| text.contains(spelling.as_str()))
        {
            return Some(spelling);
        }

        // Other casings and spacings, e.g. `[COMPANY NAME]` or `{{Company.Name}}`.
        let bracketed = BRACKETED.find_iter(text).map(|m| m.as_str());
        let braced = double_brace_pattern().find_iter(text).map(|m| m.as_str());
        if let Some(literal) = bracketed
            .chain(braced)
            .find(|literal| normalize_field_name(literal) == field)
        {
            return Some(literal.to_string());
        }

        NAMED_BLANK
            .captures_iter(text)
            .find(|caps| normalize_field_name(&caps[2]) == field)
            .map(|caps| caps[1].to_string())
    }
}

#[async_trait]
impl FieldOracle for OfflineOracle {
    fn name(&self) -> &str {
        "offline"
    }

    async fn detect_fields(&self, document_text: &str) -> Result<Vec<String>, OracleError> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        let mut push = |name: &str| {
            let name = name.trim();
            if seen.insert(name.to_lowercase()) {
                names.push(name.to_string());
            }
        };

        for caps in double_brace_pattern().captures_iter(document_text) {
            push(&caps[1]);
        }
        for caps in BRACKETED.captures_iter(document_text) {
            if !is_structural_reference(&caps[1]) {
                push(&caps[1]);
            }
        }
        for caps in NAMED_BLANK.captures_iter(document_text) {
            push(&caps[2]);
        }

        tracing::debug!(count = names.len(), "Offline detection finished");
        Ok(names)
    }

    async fn classify_and_phrase(
        &self,
        fields: &[String],
    ) -> Result<HashMap<String, FieldGuidance>, OracleError> {
        Ok(fields
            .iter()
            .map(|field| (field.clone(), Self::phrase(field)))
            .collect())
    }

    async fn resolve_placeholders(
        &self,
        document_text: &str,
        fields: &[String],
    ) -> Result<HashMap<String, String>, OracleError> {
        Ok(fields
            .iter()
            .filter_map(|field| Self::locate(document_text, field).map(|l| (field.clone(), l)))
            .collect())
    }
}
