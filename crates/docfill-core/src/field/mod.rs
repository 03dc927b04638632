//! Field domain module.
//!
//! # Module Structure
//!
//! - `normalize`: raw placeholder name → field identifier, and back to a question
//! - `classify`: naming-heuristic input type inference (`FieldType`)
//! - `extract`: deterministic and oracle-backed placeholder extraction

mod classify;
mod extract;
mod normalize;

pub use classify::{FieldType, classify_field};
pub use extract::{
    ExtractionMode, ExtractionOutcome, ExtractionSource, PlaceholderExtractor,
    double_brace_pattern, extract_deterministic, normalize_names,
};
pub use normalize::{default_question, humanize_field_name, normalize_field_name};
