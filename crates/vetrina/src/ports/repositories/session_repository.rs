//! Session Repository Port

use async_trait::async_trait;

use crate::domain::{errors::DomainError, Session};

/// Repository interface for Session records.
///
/// Writes are at-least-once with last-write-wins semantics: concurrent
/// saves of the same session may lose an update, which only biases future
/// ranking and is tolerated by design.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find(&self, session_id: &str) -> Result<Option<Session>, DomainError>;

    /// Persist the full session document. The optional preference embedding
    /// (derived from recent queries) makes sessions vector-searchable; it is
    /// best-effort and may be absent.
    async fn save(
        &self,
        session: &Session,
        preference_embedding: Option<Vec<f32>>,
    ) -> Result<(), DomainError>;
}
