//! Question/answer state machine derived from a [`Session`].
//!
//! A session is `Collecting` while any field lacks an answer and `Complete`
//! once every field has one. The state is never stored; it is recomputed
//! from `fields` and `answers` on every read.

use super::model::Session;
use crate::error::{DocfillError, Result};
use crate::field::{FieldType, default_question};
use serde::Serialize;

/// Answered / total counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.answered == self.total
    }
}

/// The next field to ask about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPrompt {
    pub field: String,
    pub field_type: FieldType,
    pub question: String,
    /// True when the question came from the oracle rather than the generated fallback
    pub is_ai_phrased: bool,
    pub progress: Progress,
}

/// Result of [`next_question`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextQuestion {
    Ask(FieldPrompt),
    Done(Progress),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Collecting,
    Complete,
}

pub fn progress(session: &Session) -> Progress {
    let answered = session
        .fields()
        .iter()
        .filter(|field| session.answers().contains_key(*field))
        .count();
    Progress {
        answered,
        total: session.fields().len(),
    }
}

pub fn state(session: &Session) -> SessionState {
    if is_complete(session) {
        SessionState::Complete
    } else {
        SessionState::Collecting
    }
}

/// True iff every field has an answer.
pub fn is_complete(session: &Session) -> bool {
    progress(session).is_complete()
}

/// Unanswered fields, in session order.
pub fn missing_fields(session: &Session) -> Vec<String> {
    session
        .fields()
        .iter()
        .filter(|field| !session.answers().contains_key(*field))
        .cloned()
        .collect()
}

/// Returns the lowest-ordered unanswered field, or `Done` when none is left.
///
/// The order is the one fixed at session creation. Fields answered out of
/// sequence are simply skipped.
pub fn next_question(session: &Session) -> NextQuestion {
    let progress = progress(session);
    let next = session
        .fields()
        .iter()
        .find(|field| !session.answers().contains_key(*field));

    match next {
        None => NextQuestion::Done(progress),
        Some(field) => {
            let (question, is_ai_phrased) = match session.questions().get(field) {
                Some(question) => (question.clone(), true),
                None => (default_question(field), false),
            };
            NextQuestion::Ask(FieldPrompt {
                field: field.clone(),
                field_type: session.field_type(field),
                question,
                is_ai_phrased,
                progress,
            })
        }
    }
}

/// Fails with `IncompleteState` listing the unanswered fields, if any.
pub fn ensure_complete(session: &Session) -> Result<()> {
    let missing = missing_fields(session);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DocfillError::IncompleteState { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(fields: &[&str]) -> Session {
        Session::new(
            "s1",
            Vec::new(),
            fields.iter().map(|f| f.to_string()).collect(),
        )
    }

    fn asked(next: NextQuestion) -> FieldPrompt {
        match next {
            NextQuestion::Ask(prompt) => prompt,
            NextQuestion::Done(p) => panic!("expected a prompt, got Done({p:?})"),
        }
    }

    #[test]
    fn test_walks_fields_in_order() {
        let mut s = session(&["a", "b"]);

        let first = asked(next_question(&s));
        assert_eq!(first.field, "a");
        assert_eq!(first.progress, Progress { answered: 0, total: 2 });

        s.record_answer("a", "1").unwrap();
        let second = asked(next_question(&s));
        assert_eq!(second.field, "b");
        assert_eq!(second.progress, Progress { answered: 1, total: 2 });

        s.record_answer("b", "2").unwrap();
        assert_eq!(
            next_question(&s),
            NextQuestion::Done(Progress { answered: 2, total: 2 })
        );
        assert_eq!(state(&s), SessionState::Complete);
    }

    #[test]
    fn test_out_of_order_answers_keep_lowest_unanswered_next() {
        let mut s = session(&["a", "b", "c"]);
        s.record_answer("c", "3").unwrap();
        assert_eq!(asked(next_question(&s)).field, "a");
        s.record_answer("a", "1").unwrap();
        assert_eq!(asked(next_question(&s)).field, "b");
        assert_eq!(missing_fields(&s), vec!["b"]);
    }

    #[test]
    fn test_generated_and_ai_questions() {
        let mut s = session(&["client_name", "due_date"]);
        let prompt = asked(next_question(&s));
        assert_eq!(prompt.question, "What is the Client Name?");
        assert!(!prompt.is_ai_phrased);
        assert_eq!(prompt.field_type, FieldType::Text);

        s.set_question("client_name", "Who is the client?");
        let prompt = asked(next_question(&s));
        assert_eq!(prompt.question, "Who is the client?");
        assert!(prompt.is_ai_phrased);

        s.record_answer("client_name", "Acme").unwrap();
        assert_eq!(asked(next_question(&s)).field_type, FieldType::Date);
    }

    #[test]
    fn test_completion_is_independent_of_order() {
        let mut forward = session(&["x", "y", "z"]);
        let mut backward = forward.clone();
        for f in ["x", "y", "z"] {
            forward.record_answer(f, "v").unwrap();
        }
        for f in ["z", "y", "x"] {
            assert!(!is_complete(&backward));
            backward.record_answer(f, "v").unwrap();
        }
        assert!(is_complete(&forward));
        assert!(is_complete(&backward));
        assert_eq!(forward.answers().len(), forward.fields().len());
    }

    #[test]
    fn test_resubmission_does_not_change_progress() {
        let mut s = session(&["a", "b"]);
        s.record_answer("a", "1").unwrap();
        s.record_answer("a", "2").unwrap();
        assert_eq!(progress(&s), Progress { answered: 1, total: 2 });
        assert_eq!(state(&s), SessionState::Collecting);
    }

    #[test]
    fn test_ensure_complete_lists_missing() {
        let mut s = session(&["a", "b"]);
        s.record_answer("b", "2").unwrap();
        assert_eq!(
            ensure_complete(&s).unwrap_err(),
            DocfillError::IncompleteState {
                missing: vec!["a".to_string()]
            }
        );
        s.record_answer("a", "1").unwrap();
        assert!(ensure_complete(&s).is_ok());
    }
}
