//! Document substitution engine.
//!
//! Filling happens in two steps. [`SubstitutionEngine::plan`] decides *what*
//! to replace: exact `{{field}}` tokens when no oracle is configured,
//! literals resolved by the oracle otherwise, and heuristic spellings when the
//! oracle path fails. A [`TemplateDocument`] then applies the plan to its own
//! markup, so the engine never needs to know about the container format.

use crate::error::{DocfillError, Result};
use crate::field::{double_brace_pattern, humanize_field_name, normalize_field_name};
use crate::oracle::FieldOracle;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Escapes plain text for the markup a plan is applied to.
pub type EscapeFn = for<'a> fn(&'a str) -> Cow<'a, str>;

/// Identity escape, for documents whose markup is plain text.
pub fn no_escape(text: &str) -> Cow<'_, str> {
    Cow::Borrowed(text)
}

/// Literal placeholder text → answer, in replacement priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping. Empty literals and literals already present are ignored.
    pub fn insert(&mut self, literal: impl Into<String>, answer: impl Into<String>) {
        let literal = literal.into();
        if literal.is_empty() || self.entries.iter().any(|(l, _)| *l == literal) {
            return;
        }
        self.entries.push((literal, answer.into()));
        // Longer literals win when one placeholder contains another.
        self.entries
            .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    }

    /// Candidate spellings for every answered field.
    pub fn heuristic(answers: &HashMap<String, String>) -> Self {
        let mut map = Self::new();
        for (field, answer) in sorted(answers) {
            for literal in candidate_spellings(field) {
                map.insert(literal, answer.clone());
            }
        }
        map
    }

    /// Builds the map from an oracle resolution.
    ///
    /// Only fields that have an answer are used. Answered fields the oracle
    /// left out get the heuristic spellings instead.
    pub fn from_resolution(
        resolution: &HashMap<String, String>,
        answers: &HashMap<String, String>,
    ) -> Self {
        let mut map = Self::new();
        for (field, answer) in sorted(answers) {
            match resolution.get(field).map(|literal| literal.trim()) {
                Some(literal) if !literal.is_empty() => map.insert(literal, answer.clone()),
                _ => {
                    for literal in candidate_spellings(field) {
                        map.insert(literal, answer.clone());
                    }
                }
            }
        }
        map
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, literal: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == literal)
            .map(|(_, answer)| answer.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, a)| (l.as_str(), a.as_str()))
    }
}

fn sorted(answers: &HashMap<String, String>) -> BTreeMap<&String, &String> {
    answers.iter().collect()
}

/// Placeholder spellings tried for a field when no resolution is available.
///
/// `{{field}}`, `[field]`, `[Field Name]` and `[fieldname]`, without
/// duplicates. Bare underscore blanks are never produced.
pub fn candidate_spellings(field: &str) -> Vec<String> {
    let candidates = [
        format!("{{{{{field}}}}}"),
        format!("[{field}]"),
        format!("[{}]", humanize_field_name(field)),
        format!("[{}]", field.replace('_', "")),
    ];

    let mut spellings: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate != "[]" && !spellings.contains(&candidate) {
            spellings.push(candidate);
        }
    }
    spellings
}

/// How a plan was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    /// `{{field}}` tokens, no oracle involved
    Exact,
    /// Literals returned by the oracle
    Resolved,
    /// Candidate spellings after an oracle failure
    Heuristic,
}

/// What to replace in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillPlan {
    /// Replace every `{{token}}` whose normalized token has an answer
    Exact(HashMap<String, String>),
    /// Replace every occurrence of each literal with its answer
    Literal {
        map: PlaceholderMap,
        source: PlanSource,
    },
}

/// Text after substitution, with the number of placeholders replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    pub replacements: usize,
}

impl FillPlan {
    pub fn source(&self) -> PlanSource {
        match self {
            FillPlan::Exact(_) => PlanSource::Exact,
            FillPlan::Literal { source, .. } => *source,
        }
    }

    /// Applies the plan to `markup`.
    ///
    /// Placeholders and answers are passed through `escape` first, so the
    /// same plan can be applied to plain text or to XML. Every occurrence is
    /// replaced in a single left-to-right pass: inserted answers are never
    /// matched again, and the longest literal wins at any position.
    /// Placeholders without an answer are left untouched.
    pub fn apply(&self, markup: &str, escape: EscapeFn) -> Result<Substitution> {
        let mut replacements = 0usize;

        let text = match self {
            FillPlan::Exact(answers) => double_brace_pattern()
                .replace_all(markup, |caps: &Captures| {
                    match answers.get(&normalize_field_name(&caps[1])) {
                        Some(answer) => {
                            replacements += 1;
                            escape(answer).into_owned()
                        }
                        None => caps[0].to_string(),
                    }
                })
                .into_owned(),
            FillPlan::Literal { map, .. } if map.is_empty() => markup.to_string(),
            FillPlan::Literal { map, source } => {
                let escaped: HashMap<String, String> = map
                    .iter()
                    .map(|(literal, answer)| {
                        (escape(literal).into_owned(), escape(answer).into_owned())
                    })
                    .collect();

                // Alternation order follows the map: longest literal first.
                let alternation = map
                    .iter()
                    .map(|(literal, _)| regex::escape(&escape(literal)))
                    .collect::<Vec<_>>()
                    .join("|");
                let pattern = Regex::new(&alternation).map_err(|e| {
                    DocfillError::generation_failed(format!("invalid placeholder pattern: {e}"))
                })?;

                pattern
                    .replace_all(markup, |caps: &Captures| {
                        let found = &caps[0];
                        match escaped.get(found) {
                            Some(answer) => {
                                replacements += 1;
                                if *source == PlanSource::Heuristic {
                                    tracing::debug!(placeholder = found, "Heuristic replacement");
                                }
                                answer.clone()
                            }
                            None => found.to_string(),
                        }
                    })
                    .into_owned()
            }
        };

        Ok(Substitution { text, replacements })
    }
}

/// Filled document bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub replacements: usize,
}

/// A template that can expose its text and apply a [`FillPlan`] to its markup.
pub trait TemplateDocument: Send + Sync {
    /// Human-readable text content, used for extraction and oracle prompts.
    fn plain_text(&self) -> String;

    /// Produces the filled document. Content outside matched placeholders
    /// must be preserved byte for byte.
    fn render(&self, plan: &FillPlan) -> Result<RenderedDocument>;
}

/// A UTF-8 text template, mostly useful in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainTextDocument(pub String);

impl TemplateDocument for PlainTextDocument {
    fn plain_text(&self) -> String {
        self.0.clone()
    }

    fn render(&self, plan: &FillPlan) -> Result<RenderedDocument> {
        let substitution = plan.apply(&self.0, no_escape)?;
        Ok(RenderedDocument {
            bytes: substitution.text.into_bytes(),
            replacements: substitution.replacements,
        })
    }
}

/// Chooses a resolution strategy and fills documents with it.
#[derive(Clone, Default)]
pub struct SubstitutionEngine {
    oracle: Option<Arc<dyn FieldOracle>>,
}

impl std::fmt::Debug for SubstitutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubstitutionEngine")
            .field("oracle", &self.oracle.as_ref().map(|o| o.name().to_string()))
            .finish()
    }
}

impl SubstitutionEngine {
    pub fn new(oracle: Option<Arc<dyn FieldOracle>>) -> Self {
        Self { oracle }
    }

    /// Builds the fill plan for `answers` against `document_text`.
    ///
    /// Never fails: an oracle error degrades to the heuristic plan.
    pub async fn plan(&self, document_text: &str, answers: &HashMap<String, String>) -> FillPlan {
        let Some(oracle) = &self.oracle else {
            return FillPlan::Exact(answers.clone());
        };

        let fields: Vec<String> = sorted(answers).into_keys().cloned().collect();
        match oracle.resolve_placeholders(document_text, &fields).await {
            Ok(resolution) => {
                tracing::debug!(
                    oracle = oracle.name(),
                    resolved = resolution.len(),
                    requested = fields.len(),
                    "Resolved placeholders"
                );
                FillPlan::Literal {
                    map: PlaceholderMap::from_resolution(&resolution, answers),
                    source: PlanSource::Resolved,
                }
            }
            Err(err) => {
                tracing::warn!(
                    oracle = oracle.name(),
                    error = %err,
                    "Placeholder resolution failed, using heuristic spellings"
                );
                FillPlan::Literal {
                    map: PlaceholderMap::heuristic(answers),
                    source: PlanSource::Heuristic,
                }
            }
        }
    }

    /// Fills `document` with `answers`.
    ///
    /// # Errors
    ///
    /// `GenerationFailed` when the document cannot be rendered. Oracle
    /// failures alone never cause an error.
    pub async fn fill(
        &self,
        document: &dyn TemplateDocument,
        answers: &HashMap<String, String>,
    ) -> Result<RenderedDocument> {
        let plan = self.plan(&document.plain_text(), answers).await;
        let rendered = document.render(&plan).map_err(|e| match e {
            DocfillError::GenerationFailed(_) => e,
            other => DocfillError::generation_failed(other.to_string()),
        })?;

        if plan.source() == PlanSource::Heuristic && rendered.replacements > 0 {
            tracing::warn!(
                replacements = rendered.replacements,
                "Document filled from guessed placeholder spellings"
            );
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{FieldGuidance, OracleError};
    use async_trait::async_trait;

    fn answers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    struct Resolver(std::result::Result<HashMap<String, String>, OracleError>);

    #[async_trait]
    impl FieldOracle for Resolver {
        fn name(&self) -> &str {
            "resolver"
        }

        async fn detect_fields(&self, _: &str) -> std::result::Result<Vec<String>, OracleError> {
            Ok(Vec::new())
        }

        async fn classify_and_phrase(
            &self,
            _: &[String],
        ) -> std::result::Result<HashMap<String, FieldGuidance>, OracleError> {
            Ok(HashMap::new())
        }

        async fn resolve_placeholders(
            &self,
            _: &str,
            _: &[String],
        ) -> std::result::Result<HashMap<String, String>, OracleError> {
            self.0.clone()
        }
    }

    async fn fill_text(engine: &SubstitutionEngine, text: &str, a: &[(&str, &str)]) -> String {
        let rendered = engine
            .fill(&PlainTextDocument(text.to_string()), &answers(a))
            .await
            .unwrap();
        String::from_utf8(rendered.bytes).unwrap()
    }

    #[tokio::test]
    async fn test_exact_mode_fills_double_braces() {
        let engine = SubstitutionEngine::default();
        assert_eq!(
            fill_text(&engine, "Dear {{name}}", &[("name", "Bob")]).await,
            "Dear Bob"
        );
    }

    #[tokio::test]
    async fn test_exact_mode_ignores_unmatched_answers() {
        let engine = SubstitutionEngine::default();
        let text = "Dear {{name}}, see {{other}}.";
        assert_eq!(
            fill_text(&engine, text, &[("name", "Bob"), ("unused", "x")]).await,
            "Dear Bob, see {{other}}."
        );
    }

    #[test]
    fn test_exact_mode_counts_every_occurrence() {
        let plan = FillPlan::Exact(answers(&[("amount", "100")]));
        let out = plan.apply("{{amount}} / {{Amount}} / {{amount}}", no_escape).unwrap();
        assert_eq!(out.text, "100 / 100 / 100");
        assert_eq!(out.replacements, 3);
    }

    #[tokio::test]
    async fn test_resolved_literals_are_replaced_everywhere() {
        let oracle = Resolver(Ok(answers(&[
            ("company_name", "[COMPANY]"),
            ("purchase_amount", "$[_____________]"),
        ])));
        let engine = SubstitutionEngine::new(Some(Arc::new(oracle)));
        let text = "[COMPANY] pays $[_____________]. Signed, [COMPANY].";
        assert_eq!(
            fill_text(
                &engine,
                text,
                &[("company_name", "Acme"), ("purchase_amount", "$5,000")]
            )
            .await,
            "Acme pays $5,000. Signed, Acme."
        );
    }

    #[tokio::test]
    async fn test_oracle_failure_falls_back_to_heuristic() {
        let oracle = Resolver(Err(OracleError::QuotaExhausted("429".into())));
        let engine = SubstitutionEngine::new(Some(Arc::new(oracle)));
        let text = "[Company Name] and {{investor_name}} and [dateofsafe] and $[____]";
        assert_eq!(
            fill_text(
                &engine,
                text,
                &[
                    ("company_name", "Acme"),
                    ("investor_name", "Jane"),
                    ("date_of_safe", "2024-01-01"),
                ]
            )
            .await,
            "Acme and Jane and 2024-01-01 and $[____]"
        );
    }

    #[test]
    fn test_inserted_answers_are_not_rescanned() {
        let mut map = PlaceholderMap::new();
        map.insert("[A]", "[B]");
        map.insert("[B]", "b");
        let plan = FillPlan::Literal {
            map,
            source: PlanSource::Resolved,
        };
        let out = plan.apply("[A] [B]", no_escape).unwrap();
        assert_eq!(out.text, "[B] b");
        assert_eq!(out.replacements, 2);
    }

    #[test]
    fn test_longest_literal_wins() {
        let mut map = PlaceholderMap::new();
        map.insert("$[___]", "short");
        map.insert("$[_____]", "long");
        let plan = FillPlan::Literal {
            map,
            source: PlanSource::Resolved,
        };
        assert_eq!(plan.apply("$[_____] $[___]", no_escape).unwrap().text, "long short");
    }

    #[test]
    fn test_escape_is_applied_to_literals_and_answers() {
        fn xmlish(text: &str) -> Cow<'_, str> {
            Cow::Owned(text.replace('&', "&amp;"))
        }
        let mut map = PlaceholderMap::new();
        map.insert("[R&D Lead]", "Smith & Sons");
        let plan = FillPlan::Literal {
            map,
            source: PlanSource::Resolved,
        };
        let out = plan.apply("<w:t>[R&amp;D Lead]</w:t>", xmlish).unwrap();
        assert_eq!(out.text, "<w:t>Smith &amp; Sons</w:t>");
    }

    #[test]
    fn test_candidate_spellings() {
        assert_eq!(
            candidate_spellings("company_name"),
            vec![
                "{{company_name}}",
                "[company_name]",
                "[Company Name]",
                "[companyname]"
            ]
        );
        assert_eq!(candidate_spellings("name"), vec!["{{name}}", "[name]", "[Name]"]);
    }

    #[test]
    fn test_from_resolution_skips_unanswered_and_blank() {
        let resolution = answers(&[("a", "[A]"), ("b", "  "), ("stray", "[S]")]);
        let map = PlaceholderMap::from_resolution(&resolution, &answers(&[("a", "1"), ("b", "2")]));
        assert_eq!(map.get("[A]"), Some("1"));
        assert_eq!(map.get("[S]"), None);
        assert_eq!(map.get("{{b}}"), Some("2"));
        assert_eq!(map.get("  "), None);
    }

    #[test]
    fn test_empty_literal_plan_is_identity() {
        let plan = FillPlan::Literal {
            map: PlaceholderMap::new(),
            source: PlanSource::Heuristic,
        };
        let out = plan.apply("unchanged", no_escape).unwrap();
        assert_eq!(out.text, "unchanged");
        assert_eq!(out.replacements, 0);
    }
}
