//! Application layer for Docfill.
//!
//! Use cases that coordinate the domain rules in `docfill-core`, the `.docx`
//! container in `docfill-infrastructure` and whichever semantic oracles the
//! composition root wires in.

pub mod document_usecase;
pub mod session;

pub use document_usecase::{
    AnswerReceipt, DocumentUseCase, GeneratedDocument, QuestionEnrichment, QuestionSource,
    UploadOutcome, is_docx_filename,
};
pub use session::SessionStore;
