//! Domain Errors
//!
//! Error types for domain operations. The service layer maps these to
//! structured HTTP error responses; nothing here knows about transport.

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed input. Never retried, surfaced to the caller as-is.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// Embedding provider failed after local retries were exhausted.
    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    /// The vector store could not be reached. Callers with a lexical
    /// fallback degrade instead of propagating this.
    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    /// Upstream catalog API failure (whole-request level; individual
    /// record failures are reported in the sync summary instead).
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A catalog sync is already running. Syncs are exclusive.
    #[error("A catalog sync is already in progress")]
    SyncInProgress,
}

impl DomainError {
    pub fn not_found<T: AsRef<str>>(entity_type: T, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
