//! Embedding Provider Port

use async_trait::async_trait;

use crate::domain::errors::DomainError;

/// External embedding provider: text in, fixed-dimension vector out.
///
/// Deterministic for a fixed provider+model version; not guaranteed
/// deterministic across versions, which is why stored products carry the
/// model tag they were embedded with. Implementations retry transport and
/// rate-limit failures with bounded backoff before surfacing
/// `DomainError::EmbeddingProvider`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Generate embeddings for multiple texts in one provider call where
    /// supported, to bound request overhead. Output order matches input.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError>;

    /// Provider+model version tag stored alongside product vectors
    fn model(&self) -> &str;
}
