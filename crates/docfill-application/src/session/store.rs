use docfill_core::error::{DocfillError, Result};
use docfill_core::session::Session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

type SessionSlot = Arc<RwLock<Session>>;

/// In-memory store of upload sessions.
///
/// The outer map lock is only held long enough to look a session up, so
/// work on one session never blocks another. Each session sits behind its
/// own `RwLock`: readers share it, and [`SessionStore::update`] takes it
/// exclusively, which linearizes mutations of the same session.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionSlot>>,
}

impl SessionStore {
    /// Creates a new empty SessionStore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and stores a session over `fields`.
    ///
    /// The identifier is a random v4 UUID in its 32-digit hex form.
    pub async fn create(&self, document: Vec<u8>, fields: Vec<String>) -> Session {
        let id = Uuid::new_v4().simple().to_string();
        let session = Session::new(id.clone(), document, fields);

        let mut sessions = self.sessions.write().await;
        sessions.insert(id, Arc::new(RwLock::new(session.clone())));
        session
    }

    /// Returns a snapshot of the session.
    ///
    /// # Errors
    ///
    /// `NotFound` when no session has this id.
    pub async fn get(&self, session_id: &str) -> Result<Session> {
        let slot = self.slot(session_id).await?;
        let session = slot.read().await;
        Ok(session.clone())
    }

    /// Applies `mutator` to the session under its exclusive lock.
    ///
    /// `updatedAt` is refreshed only when the mutator succeeds. The mutator
    /// may return a value computed from the committed state, e.g. progress
    /// counters after the write.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The session doesn't exist
    /// - The mutator returns an error
    pub async fn update<F, T>(&self, session_id: &str, mutator: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        let slot = self.slot(session_id).await?;
        let mut session = slot.write().await;
        let value = mutator(&mut session)?;
        session.touch();
        Ok(value)
    }

    /// Removes a session.
    ///
    /// # Errors
    ///
    /// `NotFound` when no session has this id.
    pub async fn delete(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| DocfillError::session_not_found(session_id))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn slot(&self, session_id: &str) -> Result<SessionSlot> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| DocfillError::session_not_found(session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_generates_distinct_random_ids() {
        let store = SessionStore::new();
        let a = store.create(b"doc".to_vec(), fields(&["a"])).await;
        let b = store.create(b"doc".to_vec(), fields(&["a"])).await;

        assert_ne!(a.id(), b.id());
        assert_eq!(a.id().len(), 32);
        assert!(a.id().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_get_unknown_session() {
        let store = SessionStore::new();
        let err = store.get("missing").await.unwrap_err();
        assert!(err.is_session_not_found());
    }

    #[tokio::test]
    async fn test_update_commits_and_touches() {
        let store = SessionStore::new();
        let created = store.create(Vec::new(), fields(&["a", "b"])).await;

        let answered = store
            .update(created.id(), |session| {
                session.record_answer("a", "1")?;
                Ok(session.answers().len())
            })
            .await
            .unwrap();

        assert_eq!(answered, 1);
        let stored = store.get(created.id()).await.unwrap();
        assert_eq!(stored.answers()["a"], "1");
        assert!(stored.updated_at() >= created.updated_at());
    }

    #[tokio::test]
    async fn test_failed_mutator_leaves_session_untouched() {
        let store = SessionStore::new();
        let created = store.create(Vec::new(), fields(&["a"])).await;

        let err = store
            .update(created.id(), |session| session.record_answer("nope", "x"))
            .await
            .unwrap_err();

        assert!(err.is_field_not_found());
        let stored = store.get(created.id()).await.unwrap();
        assert!(stored.answers().is_empty());
        assert_eq!(stored.updated_at(), created.updated_at());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = SessionStore::new();
        let created = store.create(Vec::new(), fields(&["a"])).await;

        store.delete(created.id()).await.unwrap();
        assert!(store.is_empty().await);
        assert!(store.delete(created.id()).await.unwrap_err().is_session_not_found());
    }
}
