//! Test fakes: in-memory port implementations and a deterministic embedder.
//!
//! The bag-of-words embedder hashes terms into a small fixed vector so
//! similarity behaves predictably: texts sharing vocabulary score high,
//! disjoint texts score near zero, and reruns are bit-identical.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use vetrina::{
    CatalogPage, CatalogSource, DomainError, EmbeddingProvider, InteractionEvent,
    InteractionRepository, Product, ProductRepository, SearchFilters, Session, SessionRepository,
    TrendingEntry,
};

const EMBED_DIM: usize = 256;

pub fn product_named(id: i64, name: &str, description: &str, categories: &[&str]) -> Product {
    product_priced(id, name, description, categories, 1000.0)
}

pub fn product_priced(
    id: i64,
    name: &str,
    description: &str,
    categories: &[&str],
    price: f64,
) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: description.to_string(),
        short_description: String::new(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        tags: Vec::new(),
        price,
        currency: "INR".to_string(),
        stock_status: "instock".to_string(),
        image_url: None,
        permalink: format!("https://shop.test/product/{}", id),
        rating: 0.0,
        review_count: 0,
        synced_at: Utc::now(),
        embedding_model: "bag-of-words".to_string(),
    }
}

/// Deterministic embedder: terms hashed into a fixed-size count vector,
/// L2-normalized.
#[derive(Default)]
pub struct BagOfWordsEmbedder {
    calls: AtomicUsize,
    fail_next: AtomicBool,
}

impl BagOfWordsEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trait calls made so far (the sync helper does not count)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next trait call fail once
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn model_tag(&self) -> &str {
        "bag-of-words"
    }

    /// Synchronous embedding, usable for seeding stores in tests
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; EMBED_DIM];
        for term in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
        {
            let mut hash: u64 = 1469598103934665603;
            for byte in term.bytes() {
                hash = hash.wrapping_mul(31).wrapping_add(byte as u64);
            }
            vector[(hash % EMBED_DIM as u64) as usize] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }

    fn take_failure(&self) -> Result<(), DomainError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            Err(DomainError::EmbeddingProvider(
                "injected embedding failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn model(&self) -> &str {
        "bag-of-words"
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

/// In-memory store implementing all three repository ports, with failure
/// injection for outage scenarios.
#[derive(Default)]
pub struct InMemoryStore {
    products: RwLock<HashMap<i64, (Product, Vec<f32>)>>,
    sessions: RwLock<HashMap<String, Session>>,
    events: RwLock<Vec<InteractionEvent>>,
    search_calls: AtomicUsize,
    fail_searches: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, product: Product, vector: Vec<f32>) {
        self.products
            .write()
            .await
            .insert(product.id, (product, vector));
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Make similarity lookups fail until cleared
    pub fn fail_searches(&self) {
        self.fail_searches.store(true, Ordering::SeqCst);
    }

    fn check_search_available(&self) -> Result<(), DomainError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_searches.load(Ordering::SeqCst) {
            Err(DomainError::StoreUnavailable(
                "injected store outage".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

fn rank_scored(mut scored: Vec<(Product, f32)>, limit: usize) -> Vec<(Product, f32)> {
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.id.cmp(&b.0.id))
    });
    scored.truncate(limit);
    scored
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn upsert(&self, product: &Product, vector: Vec<f32>) -> Result<(), DomainError> {
        self.products
            .write()
            .await
            .insert(product.id, (product.clone(), vector));
        Ok(())
    }

    async fn get(&self, product_id: i64) -> Result<Option<Product>, DomainError> {
        Ok(self
            .products
            .read()
            .await
            .get(&product_id)
            .map(|(p, _)| p.clone()))
    }

    async fn similarity_search(
        &self,
        vector: Vec<f32>,
        limit: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<(Product, f32)>, DomainError> {
        self.check_search_available()?;
        let guard = self.products.read().await;
        let scored = guard
            .values()
            .filter(|(p, _)| filters.matches(&p.categories, &p.tags, p.price, p.in_stock()))
            .map(|(p, v)| (p.clone(), cosine(&vector, v)))
            .collect();
        Ok(rank_scored(scored, limit))
    }

    async fn similar_to_product(
        &self,
        product_id: i64,
        limit: usize,
    ) -> Result<Vec<(Product, f32)>, DomainError> {
        self.check_search_available()?;
        let guard = self.products.read().await;
        let (_, anchor) = guard
            .get(&product_id)
            .ok_or_else(|| DomainError::not_found("product", product_id))?;
        let scored = guard
            .values()
            .filter(|(p, _)| p.id != product_id)
            .map(|(p, v)| (p.clone(), cosine(anchor, v)))
            .collect();
        Ok(rank_scored(scored, limit))
    }

    async fn stale_ids(&self, current_model: &str) -> Result<Vec<i64>, DomainError> {
        let guard = self.products.read().await;
        let mut ids: Vec<i64> = guard
            .values()
            .filter(|(p, _)| p.embedding_model != current_model)
            .map(|(p, _)| p.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn scroll_all(&self, _page_size: usize) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .map(|(p, _)| p.clone())
            .collect())
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn find(&self, session_id: &str) -> Result<Option<Session>, DomainError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn save(
        &self,
        session: &Session,
        _preference_embedding: Option<Vec<f32>>,
    ) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }
}

#[async_trait]
impl InteractionRepository for InMemoryStore {
    async fn record(&self, event: &InteractionEvent) -> Result<(), DomainError> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn counts_since(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TrendingEntry>, DomainError> {
        let guard = self.events.read().await;
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for event in guard.iter().filter(|e| e.timestamp >= cutoff) {
            *counts.entry(event.product_id).or_insert(0) += 1;
        }
        let mut entries: Vec<TrendingEntry> = counts
            .into_iter()
            .map(|(product_id, interactions)| TrendingEntry {
                product_id,
                interactions,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.interactions
                .cmp(&a.interactions)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}

/// Catalog fake serving a fixed product list on page 1
pub struct ScriptedCatalog {
    products: Vec<Product>,
    failures: Vec<String>,
    delay: Option<Duration>,
}

impl ScriptedCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            failures: Vec::new(),
            delay: None,
        }
    }

    pub fn with_failures(mut self, failures: Vec<String>) -> Self {
        self.failures = failures;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl CatalogSource for ScriptedCatalog {
    async fn fetch_page(
        &self,
        page: u32,
        _per_page: u32,
        _modified_after: Option<DateTime<Utc>>,
    ) -> Result<CatalogPage, DomainError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if page == 1 {
            Ok(CatalogPage {
                products: self.products.clone(),
                failures: self.failures.clone(),
                has_more: false,
            })
        } else {
            Ok(CatalogPage {
                products: Vec::new(),
                failures: Vec::new(),
                has_more: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = InMemoryStore::new();
        let product = product_named(1, "Wheelchair", "mobility", &["Mobility"]);
        store.upsert(&product, vec![1.0, 0.0]).await.unwrap();
        store.upsert(&product, vec![1.0, 0.0]).await.unwrap();

        let all = store.scroll_all(100).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(store.get(1).await.unwrap().unwrap().name, "Wheelchair");
    }

    #[tokio::test]
    async fn test_similarity_search_orders_by_cosine() {
        let store = InMemoryStore::new();
        store
            .seed(product_named(1, "A", "", &[]), vec![1.0, 0.0])
            .await;
        store
            .seed(product_named(2, "B", "", &[]), vec![0.5, 0.5])
            .await;

        let hits = store
            .similarity_search(vec![1.0, 0.0], 10, &SearchFilters::default())
            .await
            .unwrap();
        assert_eq!(hits[0].0.id, 1);
        assert!(hits[0].1 > hits[1].1);
    }

    #[test]
    fn test_embedder_is_deterministic_and_normalized() {
        let embedder = BagOfWordsEmbedder::new();
        let a = embedder.embed_text("mobility aid for walking");
        let b = embedder.embed_text("mobility aid for walking");
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);

        let unrelated = embedder.embed_text("quantum espresso machine");
        assert!(cosine(&a, &unrelated) < cosine(&a, &embedder.embed_text("walking aid")));
    }
}
