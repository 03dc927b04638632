//! Parsing of model output into oracle results.

use docfill_core::field::FieldType;
use docfill_core::oracle::{FieldGuidance, OracleError};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::str::FromStr;

/// Removes a surrounding Markdown code fence (```` ```json ... ``` ````), if any.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the opening fence line, including its language tag.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => "",
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

pub fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, OracleError> {
    let json = strip_code_fence(content);
    serde_json::from_str(json).map_err(|e| {
        OracleError::MalformedResponse(format!("expected JSON ({e}), got {} chars", json.len()))
    })
}

/// One entry of a phrasing response: either a bare question or an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PhrasedField {
    Question(String),
    Detailed {
        question: String,
        #[serde(default, rename = "type")]
        field_type: Option<String>,
    },
}

/// Parses a phrasing response. Unknown input types are ignored.
pub fn parse_guidance(content: &str) -> Result<HashMap<String, FieldGuidance>, OracleError> {
    let raw: HashMap<String, PhrasedField> = parse_json(content)?;
    Ok(raw
        .into_iter()
        .map(|(field, phrased)| {
            let guidance = match phrased {
                PhrasedField::Question(question) => FieldGuidance {
                    question,
                    field_type: None,
                },
                PhrasedField::Detailed {
                    question,
                    field_type,
                } => FieldGuidance {
                    question,
                    field_type: field_type.and_then(|t| FieldType::from_str(t.trim()).ok()),
                },
            };
            (field, guidance)
        })
        .collect())
}

/// Parses a resolution response, dropping null and blank literals.
pub fn parse_resolution(content: &str) -> Result<HashMap<String, String>, OracleError> {
    let raw: HashMap<String, Option<String>> = parse_json(content)?;
    Ok(raw
        .into_iter()
        .filter_map(|(field, literal)| {
            literal
                .filter(|literal| !literal.trim().is_empty())
                .map(|literal| (field, literal))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[\"a\"]\n```"), "[\"a\"]");
        assert_eq!(strip_code_fence("```\n{}\n```\n"), "{}");
        assert_eq!(strip_code_fence("  [1, 2] "), "[1, 2]");
        assert_eq!(strip_code_fence("```json\n[\"unterminated\"]"), "[\"unterminated\"]");
    }

    #[test]
    fn test_parse_json_reports_malformed() {
        let result: Result<Vec<String>, _> = parse_json("Sure! Here are the fields.");
        assert!(matches!(result, Err(OracleError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_guidance_accepts_both_shapes() {
        let guidance = parse_guidance(
            r#"```json
            {
              "company_name": "What's the name of your company?",
              "due_date": {"question": "When is payment due?", "type": "date"},
              "notes": {"question": "Any notes?", "type": "paragraph"}
            }
            ```"#,
        )
        .unwrap();

        assert_eq!(guidance["company_name"].field_type, None);
        assert_eq!(guidance["due_date"].field_type, Some(FieldType::Date));
        assert_eq!(guidance["due_date"].question, "When is payment due?");
        assert_eq!(guidance["notes"].field_type, None);
    }

    #[test]
    fn test_parse_resolution_drops_missing_literals() {
        let resolved =
            parse_resolution(r#"{"a": "[A]", "b": null, "c": "  "}"#).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved["a"], "[A]");
    }
}
