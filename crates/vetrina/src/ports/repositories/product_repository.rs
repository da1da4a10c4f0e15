//! Product Repository Port
//!
//! Abstract interface over the vector store's product collection.

use async_trait::async_trait;

use crate::domain::{errors::DomainError, Product, SearchFilters};

/// Repository interface for Product records and their vectors
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Store a product with its embedding. Idempotent by product id: a
    /// second upsert with identical input leaves one record with the same
    /// final state.
    async fn upsert(&self, product: &Product, embedding: Vec<f32>) -> Result<(), DomainError>;

    /// Fetch a product's stored metadata by id
    async fn get(&self, product_id: i64) -> Result<Option<Product>, DomainError>;

    /// Nearest neighbors of `query_vector` under the store's distance
    /// metric, pre-filtered by `filters`, best first with raw store scores.
    async fn similarity_search(
        &self,
        query_vector: Vec<f32>,
        limit: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<(Product, f32)>, DomainError>;

    /// Nearest neighbors of a stored product's own vector, excluding the
    /// product itself.
    async fn similar_to_product(
        &self,
        product_id: i64,
        limit: usize,
    ) -> Result<Vec<(Product, f32)>, DomainError>;

    /// Ids of products whose stored vector was produced by a model other
    /// than `current_model`. These must be re-embedded on the next sync.
    async fn stale_ids(&self, current_model: &str) -> Result<Vec<i64>, DomainError>;

    /// Stream all stored product metadata, used to hydrate the in-process
    /// catalog cache.
    async fn scroll_all(&self, page_size: usize) -> Result<Vec<Product>, DomainError>;
}
