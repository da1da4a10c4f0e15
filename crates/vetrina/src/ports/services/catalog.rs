//! Catalog Source Port

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{errors::DomainError, Product};

/// One page of normalized catalog records.
///
/// Records that fail normalization (missing id or name) land in `failures`
/// instead of aborting the page; sync reports them and moves on.
#[derive(Debug, Default)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub failures: Vec<String>,
    pub has_more: bool,
}

/// Upstream commerce catalog: paged, authenticated product listing.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of products, normalized. `modified_after` restricts
    /// to records changed since the watermark (incremental sync).
    async fn fetch_page(
        &self,
        page: u32,
        per_page: u32,
        modified_after: Option<DateTime<Utc>>,
    ) -> Result<CatalogPage, DomainError>;
}
