use docfill_application::DocumentUseCase;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentUseCase>,
}

impl AppState {
    pub fn new(documents: DocumentUseCase) -> Self {
        Self {
            documents: Arc::new(documents),
        }
    }
}
