//! Naming-heuristic input type inference.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Input type presented to the user when answering a field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Date,
}

const DATE_PATTERNS: &[&str] = &[
    "date",
    "dob",
    "birth",
    "deadline",
    "expiry",
    "expiration",
    "anniversary",
];

const NUMBER_PATTERNS: &[&str] = &[
    "age", "count", "number", "amount", "quantity", "price", "total", "sum", "year", "months",
    "days", "hours",
];

/// Infers the input type of a field from its identifier.
///
/// Date patterns are checked before number patterns, so `birth_year` is a
/// date. Anything unmatched is text.
pub fn classify_field(field: &str) -> FieldType {
    let lower = field.to_lowercase();

    if DATE_PATTERNS.iter().any(|p| lower.contains(p)) {
        return FieldType::Date;
    }
    if NUMBER_PATTERNS.iter().any(|p| lower.contains(p)) {
        return FieldType::Number;
    }
    FieldType::Text
}
