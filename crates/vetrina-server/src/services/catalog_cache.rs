//! In-process catalog metadata cache
//!
//! Backs the degraded lexical fallback (search must answer even with the
//! vector store down) and context lookups (category/price of interacted
//! products). Refreshed by sync upserts and hydrated from the store at
//! startup, best-effort.

use std::collections::HashMap;

use tokio::sync::RwLock;

use vetrina::{Product, SearchFilters};

/// Minimum query-term length considered for lexical matching
const MIN_TERM_LEN: usize = 3;

#[derive(Default)]
pub struct CatalogCache {
    products: RwLock<HashMap<i64, Product>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    pub async fn replace_all(&self, products: Vec<Product>) {
        let mut guard = self.products.write().await;
        guard.clear();
        guard.extend(products.into_iter().map(|p| (p.id, p)));
    }

    pub async fn get(&self, product_id: i64) -> Option<Product> {
        self.products.read().await.get(&product_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    /// Lexical substring search over cached metadata. Lower quality than
    /// vector similarity by design; the caller flags the response degraded.
    ///
    /// Score: fraction of query terms appearing in the product's name,
    /// description, categories or tags.
    pub async fn lexical_search(
        &self,
        query: &str,
        limit: usize,
        filters: &SearchFilters,
    ) -> Vec<(Product, f32)> {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .filter(|t| t.len() >= MIN_TERM_LEN)
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let guard = self.products.read().await;
        let mut scored: Vec<(Product, f32)> = guard
            .values()
            .filter(|p| {
                filters.matches(&p.categories, &p.tags, p.price, p.in_stock())
            })
            .filter_map(|p| {
                let haystack = format!(
                    "{} {} {} {}",
                    p.name,
                    p.description,
                    p.categories.join(" "),
                    p.tags.join(" ")
                )
                .to_lowercase();
                let matched = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                if matched == 0 {
                    return None;
                }
                Some((p.clone(), matched as f32 / terms.len() as f32))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        scored.truncate(limit);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::product_named;

    #[tokio::test]
    async fn test_lexical_search_matches_terms() {
        let cache = CatalogCache::new();
        cache
            .upsert(product_named(1, "Foldable wheelchair", "mobility support", &["Mobility"]))
            .await;
        cache
            .upsert(product_named(2, "Hearing aid", "sound amplifier", &["Hearing"]))
            .await;

        let hits = cache
            .lexical_search("wheelchair", 10, &SearchFilters::default())
            .await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.id, 1);
        assert_eq!(hits[0].1, 1.0);
    }

    #[tokio::test]
    async fn test_lexical_search_respects_filters() {
        let cache = CatalogCache::new();
        cache
            .upsert(product_named(1, "Walking stick", "walking support", &["Mobility"]))
            .await;

        let filters = SearchFilters {
            categories: vec!["Hearing".to_string()],
            ..SearchFilters::default()
        };
        assert!(cache.lexical_search("walking", 10, &filters).await.is_empty());
    }

    #[tokio::test]
    async fn test_short_terms_are_ignored() {
        let cache = CatalogCache::new();
        cache
            .upsert(product_named(1, "Walking stick", "", &[]))
            .await;
        assert!(cache
            .lexical_search("a of in", 10, &SearchFilters::default())
            .await
            .is_empty());
    }
}
