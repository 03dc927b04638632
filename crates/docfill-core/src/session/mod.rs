//! Session domain module.
//!
//! - `model`: the [`Session`] entity and its guarded mutators
//! - `state`: derived Collecting/Complete state, next question and progress

mod model;
mod state;

pub use model::Session;
pub use state::{
    FieldPrompt, NextQuestion, Progress, SessionState, ensure_complete, is_complete,
    missing_fields, next_question, progress, state,
};
