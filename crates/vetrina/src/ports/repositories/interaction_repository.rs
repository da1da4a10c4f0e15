//! Interaction Repository Port

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{errors::DomainError, InteractionEvent, TrendingEntry};

/// Repository interface for interaction events, the source of the trending
/// listing.
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    async fn record(&self, event: &InteractionEvent) -> Result<(), DomainError>;

    /// Interaction counts per product since `cutoff`, most interacted
    /// first, ties broken by ascending product id.
    async fn counts_since(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TrendingEntry>, DomainError>;
}
