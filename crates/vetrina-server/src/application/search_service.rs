//! Search - ranking and response composition
//!
//! The query path: validate, embed, similarity search with over-fetch,
//! blend the contextual terms, order deterministically, compose the
//! conversational message and follow-up suggestions. History recording is
//! spawned after the response is composed and never blocks it.
//!
//! When the embedding provider or the vector store is unavailable the
//! service degrades to lexical matching over the in-process catalog cache
//! and flags the response; search answers as long as the process is up.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use vetrina::{
    order_results, ContextSignal, DomainError, EmbeddingProvider, InteractionEvent,
    InteractionKind, InteractionRepository, Product, ProductRepository, RankedResult,
    RankingWeights, SearchFilters, SessionRepository, TrendingEntry,
};

use crate::application::ContextService;
use crate::config;
use crate::services::CatalogCache;

/// Result-set size bounds
const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;
const DEFAULT_RECOMMEND_LIMIT: usize = 5;
/// Days over which catalog recency decays to zero
const RECENCY_HORIZON_DAYS: f32 = 30.0;
/// Follow-up suggestions per response
const MAX_SUGGESTIONS: usize = 3;

/// A composed search or recommendation response, pre-serialization
pub struct SearchOutcome {
    pub results: Vec<RankedResult>,
    pub suggestions: Vec<String>,
    pub message: String,
    pub session_id: String,
    pub degraded: bool,
}

/// Application service for search, recommendations and trending
pub struct SearchService<P, S, I, E> {
    products: Arc<P>,
    interactions: Arc<I>,
    context: Arc<ContextService<S, E>>,
    embedding: Arc<E>,
    cache: Arc<CatalogCache>,
    weights: RankingWeights,
    overfetch_factor: usize,
    embed_timeout: Duration,
    default_window: Duration,
}

impl<P, S, I, E> SearchService<P, S, I, E>
where
    P: ProductRepository + 'static,
    S: SessionRepository + 'static,
    I: InteractionRepository + 'static,
    E: EmbeddingProvider + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        products: Arc<P>,
        interactions: Arc<I>,
        context: Arc<ContextService<S, E>>,
        embedding: Arc<E>,
        cache: Arc<CatalogCache>,
        weights: RankingWeights,
        overfetch_factor: usize,
        embed_timeout: Duration,
        default_window: Duration,
    ) -> Self {
        Self {
            products,
            interactions,
            context,
            embedding,
            cache,
            weights,
            overfetch_factor: overfetch_factor.max(1),
            embed_timeout,
            default_window,
        }
    }

    /// Run a search and compose the full response.
    pub async fn search(
        &self,
        query: &str,
        session_id: Option<String>,
        limit: Option<i64>,
        filters: SearchFilters,
    ) -> Result<SearchOutcome, DomainError> {
        // Validation happens before any provider or store call
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::validation("query must not be empty"));
        }
        let limit = validate_limit(limit, DEFAULT_LIMIT)?;

        let session_id =
            session_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        // A failing session store degrades personalization, not search
        let signal = match self.context.context(&session_id).await {
            Ok(signal) => signal,
            Err(e) => {
                tracing::warn!("Context lookup failed for session {}: {}", session_id, e);
                ContextSignal::empty()
            }
        };

        let overfetch = limit * self.overfetch_factor;
        let (candidates, degraded) = self.candidates(query, overfetch, &filters).await?;

        let mut ranked: Vec<RankedResult> = candidates
            .into_iter()
            .map(|(product, raw)| self.blend(product, raw, degraded, &signal))
            .collect();
        ranked = order_results(ranked);

        let near_misses: Vec<RankedResult> = ranked.split_off(ranked.len().min(limit));
        let suggestions = self.suggestions(&ranked, &near_misses, &filters, &signal);
        let message = compose_message(query, &ranked, degraded);

        self.record_search(&session_id, query, &ranked);

        Ok(SearchOutcome {
            results: ranked,
            suggestions,
            message,
            session_id,
            degraded,
        })
    }

    /// Nearest neighbors of a stored product, excluding the product itself.
    /// No lexical fallback: a store outage surfaces as `StoreUnavailable`.
    pub async fn recommend(
        &self,
        product_id: i64,
        session_id: Option<String>,
        limit: Option<i64>,
    ) -> Result<SearchOutcome, DomainError> {
        let limit = validate_limit(limit, DEFAULT_RECOMMEND_LIMIT)?;

        let source = self
            .products
            .get(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found("product", product_id))?;

        let session_id =
            session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let signal = match self.context.context(&session_id).await {
            Ok(signal) => signal,
            Err(e) => {
                tracing::warn!("Context lookup failed for session {}: {}", session_id, e);
                ContextSignal::empty()
            }
        };

        let candidates = self
            .products
            .similar_to_product(product_id, limit * self.overfetch_factor)
            .await?;

        let mut ranked: Vec<RankedResult> = candidates
            .into_iter()
            .filter(|(p, _)| p.id != product_id)
            .map(|(product, raw)| self.blend(product, raw, false, &signal))
            .collect();
        ranked = order_results(ranked);
        ranked.truncate(limit);

        let message = if ranked.is_empty() {
            format!("No similar products found for \"{}\" yet.", source.name)
        } else {
            format!(
                "Customers looking at \"{}\" may also like these {} products.",
                source.name,
                ranked.len()
            )
        };

        self.record_view(&session_id, product_id);

        Ok(SearchOutcome {
            results: ranked,
            suggestions: Vec::new(),
            message,
            session_id,
            degraded: false,
        })
    }

    /// Most-interacted products over a rolling window.
    pub async fn trending(
        &self,
        window: Option<String>,
        limit: Option<i64>,
    ) -> Result<(String, Vec<(Product, usize)>), DomainError> {
        let limit = validate_limit(limit, DEFAULT_LIMIT)?;

        let (label, window) = match window {
            Some(spec) => {
                let parsed = config::parse_window(&spec).ok_or_else(|| {
                    DomainError::validation(format!(
                        "invalid window '{}': expected e.g. 30m, 24h or 7d",
                        spec
                    ))
                })?;
                (spec, parsed)
            }
            None => ("24h".to_string(), self.default_window),
        };

        let cutoff = Utc::now()
            - chrono::Duration::seconds(window.as_secs() as i64);
        let entries = self.interactions.counts_since(cutoff, limit).await?;

        let mut products = Vec::with_capacity(entries.len());
        for TrendingEntry {
            product_id,
            interactions,
        } in entries
        {
            // Cache first, store second; counts for products gone from
            // both are dropped from the listing.
            let product = match self.cache.get(product_id).await {
                Some(product) => Some(product),
                None => self.products.get(product_id).await?,
            };
            if let Some(product) = product {
                products.push((product, interactions));
            }
        }

        Ok((label, products))
    }

    /// Fetch scored candidates, degrading to lexical cache matching when
    /// the embedding provider times out/fails or the store is down.
    async fn candidates(
        &self,
        query: &str,
        overfetch: usize,
        filters: &SearchFilters,
    ) -> Result<(Vec<(Product, f32)>, bool), DomainError> {
        let vector = match tokio::time::timeout(self.embed_timeout, self.embedding.embed(query))
            .await
        {
            Ok(Ok(vector)) => vector,
            Ok(Err(e)) => {
                tracing::warn!("Query embedding failed, degrading to lexical: {}", e);
                return Ok((self.cache.lexical_search(query, overfetch, filters).await, true));
            }
            Err(_) => {
                tracing::warn!(
                    "Query embedding timed out after {:?}, degrading to lexical",
                    self.embed_timeout
                );
                return Ok((self.cache.lexical_search(query, overfetch, filters).await, true));
            }
        };

        match self.products.similarity_search(vector, overfetch, filters).await {
            Ok(candidates) => Ok((candidates, false)),
            Err(DomainError::StoreUnavailable(reason)) => {
                tracing::warn!("Vector store unavailable ({}), degrading to lexical", reason);
                Ok((self.cache.lexical_search(query, overfetch, filters).await, true))
            }
            Err(e) => Err(e),
        }
    }

    /// Blend a raw store score with the contextual terms.
    ///
    /// Every term lands in [0,1] before weighting: cosine scores map via
    /// (s+1)/2, lexical scores are already fractions, recency decays
    /// linearly over the horizon.
    fn blend(
        &self,
        product: Product,
        raw_score: f32,
        lexical: bool,
        signal: &ContextSignal,
    ) -> RankedResult {
        let similarity = if lexical {
            raw_score.clamp(0.0, 1.0)
        } else {
            ((raw_score + 1.0) / 2.0).clamp(0.0, 1.0)
        };

        let age_days = (Utc::now() - product.synced_at).num_hours() as f32 / 24.0;
        let recency = (1.0 - age_days / RECENCY_HORIZON_DAYS).clamp(0.0, 1.0);
        let affinity = signal.category_affinity(&product.categories);
        let deviation = signal.price_deviation(product.price);

        let blended = self.weights.blend(similarity, affinity, recency, deviation);
        let contextual_boost = blended - self.weights.similarity * similarity;

        RankedResult {
            product,
            similarity,
            contextual_boost,
            blended,
            rank: 0,
        }
    }

    /// Up to three follow-up suggestions: an unexplored result category, the
    /// dominant near-miss category, and a budget prompt when the session has
    /// no price preference.
    fn suggestions(
        &self,
        results: &[RankedResult],
        near_misses: &[RankedResult],
        filters: &SearchFilters,
        signal: &ContextSignal,
    ) -> Vec<String> {
        let mut suggestions = Vec::new();

        if let Some(category) = results
            .iter()
            .flat_map(|r| r.product.categories.iter())
            .find(|c| {
                !filters
                    .categories
                    .iter()
                    .any(|f| f.eq_ignore_ascii_case(c))
            })
        {
            suggestions.push(format!("Explore more in {}", category));
        }

        if let Some(category) = dominant_category(near_misses) {
            let line = format!("You might also browse {}", category);
            if !suggestions.contains(&line)
                && !suggestions
                    .iter()
                    .any(|s| s.ends_with(category.as_str()))
            {
                suggestions.push(line);
            }
        }

        if filters.price_min.is_none()
            && filters.price_max.is_none()
            && signal.price_band.is_none()
            && !results.is_empty()
        {
            suggestions.push("Tell me your budget and I can narrow these down".to_string());
        }

        suggestions.truncate(MAX_SUGGESTIONS);
        suggestions
    }

    /// Record the query event and per-result interactions off the request
    /// path. Failures log; the response has already been composed.
    fn record_search(&self, session_id: &str, query: &str, results: &[RankedResult]) {
        let context = self.context.clone();
        let interactions = self.interactions.clone();
        let session_id = session_id.to_string();
        let query = query.to_string();
        let returned_ids: Vec<i64> = results.iter().map(|r| r.product.id).collect();

        tokio::spawn(async move {
            if let Err(e) = context.record_query(&session_id, &query, &returned_ids).await {
                tracing::warn!("Failed to record query for session {}: {}", session_id, e);
            }
            for product_id in returned_ids {
                let event = InteractionEvent::now(
                    product_id,
                    Some(session_id.clone()),
                    InteractionKind::SearchResult,
                );
                if let Err(e) = interactions.record(&event).await {
                    tracing::warn!("Failed to record interaction: {}", e);
                }
            }
        });
    }

    fn record_view(&self, session_id: &str, product_id: i64) {
        let context = self.context.clone();
        let interactions = self.interactions.clone();
        let session_id = session_id.to_string();

        tokio::spawn(async move {
            if let Err(e) = context.record_view(&session_id, product_id).await {
                tracing::warn!("Failed to record view for session {}: {}", session_id, e);
            }
            let event = InteractionEvent::now(
                product_id,
                Some(session_id),
                InteractionKind::ProductView,
            );
            if let Err(e) = interactions.record(&event).await {
                tracing::warn!("Failed to record interaction: {}", e);
            }
        });
    }
}

fn validate_limit(limit: Option<i64>, default: usize) -> Result<usize, DomainError> {
    match limit {
        None => Ok(default),
        Some(n) if n >= 1 && n as usize <= MAX_LIMIT => Ok(n as usize),
        Some(n) => Err(DomainError::validation(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, n
        ))),
    }
}

/// Most common category among a candidate slice
fn dominant_category(candidates: &[RankedResult]) -> Option<String> {
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for candidate in candidates {
        for category in &candidate.product.categories {
            *counts.entry(category.as_str()).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(category, _)| category.to_string())
}

/// Deterministic conversational message. Template keyed by result count so
/// identical inputs always produce identical text.
fn compose_message(query: &str, results: &[RankedResult], degraded: bool) -> String {
    if results.is_empty() {
        return format!(
            "I couldn't find anything matching \"{}\". Try different words or fewer filters.",
            query
        );
    }

    let top = &results[0].product.name;
    let base = match results.len() % 3 {
        0 => format!(
            "Here are {} products for \"{}\" — \"{}\" looks like the best match.",
            results.len(),
            query,
            top
        ),
        1 => format!(
            "I found {} match(es) for \"{}\"; \"{}\" stands out.",
            results.len(),
            query,
            top
        ),
        _ => format!(
            "These {} products fit \"{}\" best, starting with \"{}\".",
            results.len(),
            query,
            top
        ),
    };

    if degraded {
        format!("{} (Showing basic matches while search is limited.)", base)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{product_named, product_priced, BagOfWordsEmbedder, InMemoryStore};

    type TestSearchService =
        SearchService<InMemoryStore, InMemoryStore, InMemoryStore, BagOfWordsEmbedder>;

    struct Harness {
        service: TestSearchService,
        store: Arc<InMemoryStore>,
        embedder: Arc<BagOfWordsEmbedder>,
        cache: Arc<CatalogCache>,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let embedder = Arc::new(BagOfWordsEmbedder::new());
        let cache = Arc::new(CatalogCache::new());
        let context = Arc::new(ContextService::new(
            store.clone(),
            embedder.clone(),
            cache.clone(),
            1800,
            0.7,
        ));
        let service = SearchService::new(
            store.clone(),
            store.clone(),
            context,
            embedder.clone(),
            cache.clone(),
            RankingWeights::default(),
            3,
            Duration::from_secs(5),
            Duration::from_secs(86400),
        );
        Harness {
            service,
            store,
            embedder,
            cache,
        }
    }

    async fn seed(h: &Harness, product: Product) {
        let vector = h.embedder.embed_text(&product.embedding_text());
        h.cache.upsert(product.clone()).await;
        h.store.seed(product, vector).await;
    }

    async fn seed_mobility_corpus(h: &Harness) {
        seed(
            h,
            product_named(
                1,
                "Foldable wheelchair",
                "lightweight mobility aid for walking support",
                &["Mobility"],
            ),
        )
        .await;
        seed(
            h,
            product_named(
                2,
                "Walking stick",
                "adjustable walking mobility aid",
                &["Mobility"],
            ),
        )
        .await;
        seed(
            h,
            product_named(
                3,
                "Hearing aid",
                "digital sound amplifier for hearing",
                &["Hearing"],
            ),
        )
        .await;
    }

    #[tokio::test]
    async fn test_mobility_query_excludes_hearing_aid() {
        let h = harness();
        seed_mobility_corpus(&h).await;

        let outcome = h
            .service
            .search("mobility aid for walking", None, Some(2), SearchFilters::default())
            .await
            .unwrap();

        let ids: Vec<i64> = outcome.results.iter().map(|r| r.product.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&1));
        assert!(ids.contains(&2));
        assert!(!ids.contains(&3));
        assert!(!outcome.degraded);
    }

    #[tokio::test]
    async fn test_results_are_ordered_and_ranked() {
        let h = harness();
        seed_mobility_corpus(&h).await;

        let outcome = h
            .service
            .search("mobility walking hearing", None, None, SearchFilters::default())
            .await
            .unwrap();

        assert!(!outcome.results.is_empty());
        for window in outcome.results.windows(2) {
            assert!(
                window[0].blended > window[1].blended
                    || (window[0].blended == window[1].blended
                        && window[0].product.id < window[1].product.id)
            );
        }
        for (i, result) in outcome.results.iter().enumerate() {
            assert_eq!(result.rank, i + 1);
        }
    }

    #[tokio::test]
    async fn test_self_similarity_ranks_product_first() {
        let h = harness();
        seed_mobility_corpus(&h).await;

        let outcome = h
            .service
            .search(
                "digital sound amplifier for hearing",
                None,
                None,
                SearchFilters::default(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.results[0].product.id, 3);
    }

    #[tokio::test]
    async fn test_validation_precedes_provider_calls() {
        let h = harness();
        seed_mobility_corpus(&h).await;

        let empty = h
            .service
            .search("   ", None, None, SearchFilters::default())
            .await;
        assert!(matches!(empty, Err(DomainError::Validation(_))));

        let zero = h
            .service
            .search("wheelchair", None, Some(0), SearchFilters::default())
            .await;
        assert!(matches!(zero, Err(DomainError::Validation(_))));

        let huge = h
            .service
            .search("wheelchair", None, Some(51), SearchFilters::default())
            .await;
        assert!(matches!(huge, Err(DomainError::Validation(_))));

        assert_eq!(h.embedder.calls(), 0);
        assert_eq!(h.store.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_store_outage_degrades_to_lexical() {
        let h = harness();
        seed_mobility_corpus(&h).await;
        h.store.fail_searches();

        let outcome = h
            .service
            .search("wheelchair", None, None, SearchFilters::default())
            .await
            .unwrap();

        assert!(outcome.degraded);
        assert_eq!(outcome.results[0].product.id, 1);
    }

    #[tokio::test]
    async fn test_embedding_failure_degrades_to_lexical() {
        let h = harness();
        seed_mobility_corpus(&h).await;
        h.embedder.fail_next();

        let outcome = h
            .service
            .search("hearing", None, None, SearchFilters::default())
            .await
            .unwrap();

        assert!(outcome.degraded);
        assert_eq!(outcome.results[0].product.id, 3);
    }

    #[tokio::test]
    async fn test_no_matches_is_empty_not_error() {
        let h = harness();
        seed_mobility_corpus(&h).await;

        let outcome = h
            .service
            .search("quantum espresso machine", None, None, SearchFilters::default())
            .await
            .unwrap();

        // The bag-of-words embedder shares no terms, so nothing scores
        assert!(outcome.message.contains("couldn't find") || !outcome.results.is_empty());
    }

    #[tokio::test]
    async fn test_session_bias_lifts_interacted_category() {
        let h = harness();
        seed(
            &h,
            product_priced(1, "Steel cane", "support aid", &["Mobility"], 500.0),
        )
        .await;
        seed(
            &h,
            product_priced(2, "Pocket amplifier", "support aid", &["Hearing"], 500.0),
        )
        .await;

        // Baseline: an ambiguous query with no session history returns both
        let baseline = h
            .service
            .search("support aid", None, None, SearchFilters::default())
            .await
            .unwrap();
        assert_eq!(baseline.results.len(), 2);
        let boost_gap =
            (baseline.results[0].contextual_boost - baseline.results[1].contextual_boost).abs();
        assert!(boost_gap < 1e-5);

        // Build mobility affinity directly through the context service
        let context = Arc::new(ContextService::new(
            h.store.clone(),
            h.embedder.clone(),
            h.cache.clone(),
            1800,
            0.7,
        ));
        context.record_query("s1", "cane", &[1]).await.unwrap();
        context.record_selection("s1", 1).await.unwrap();
        context.record_selection("s1", 1).await.unwrap();

        let biased = h
            .service
            .search(
                "support aid",
                Some("s1".to_string()),
                None,
                SearchFilters::default(),
            )
            .await
            .unwrap();

        assert_eq!(biased.results[0].product.id, 1);
        assert!(biased.results[0].contextual_boost > biased.results[1].contextual_boost);
    }

    #[tokio::test]
    async fn test_recommend_excludes_source_and_unknown_is_404() {
        let h = harness();
        seed_mobility_corpus(&h).await;

        let outcome = h.service.recommend(1, None, None).await.unwrap();
        assert!(outcome.results.iter().all(|r| r.product.id != 1));
        // Walking stick shares the mobility vocabulary
        assert_eq!(outcome.results[0].product.id, 2);

        let missing = h.service.recommend(999, None, None).await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_recommend_has_no_lexical_fallback() {
        let h = harness();
        seed_mobility_corpus(&h).await;
        h.store.fail_searches();

        let result = h.service.recommend(1, None, None).await;
        assert!(matches!(result, Err(DomainError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_trending_orders_by_interactions() {
        let h = harness();
        seed_mobility_corpus(&h).await;

        for _ in 0..3 {
            h.store
                .record(&InteractionEvent::now(2, None, InteractionKind::ProductView))
                .await
                .unwrap();
        }
        h.store
            .record(&InteractionEvent::now(1, None, InteractionKind::Selection))
            .await
            .unwrap();

        let (label, listing) = h.service.trending(None, None).await.unwrap();
        assert_eq!(label, "24h");
        assert_eq!(listing[0].0.id, 2);
        assert_eq!(listing[0].1, 3);
        assert_eq!(listing[1].0.id, 1);
        assert_eq!(listing[1].1, 1);
    }

    #[tokio::test]
    async fn test_trending_rejects_bad_window() {
        let h = harness();
        let result = h.service.trending(Some("yesterday".to_string()), None).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_suggestions_offer_categories_and_budget() {
        let h = harness();
        seed_mobility_corpus(&h).await;

        let outcome = h
            .service
            .search("mobility aid", None, None, SearchFilters::default())
            .await
            .unwrap();

        assert!(!outcome.suggestions.is_empty());
        assert!(outcome.suggestions.len() <= MAX_SUGGESTIONS);
        assert!(outcome
            .suggestions
            .iter()
            .any(|s| s.contains("budget")));
    }

    #[test]
    fn test_blend_terms_stay_in_bounds() {
        let weights = RankingWeights::default();
        for sim in [-1.0f32, -0.5, 0.0, 0.5, 1.0] {
            let normalized = ((sim + 1.0) / 2.0).clamp(0.0, 1.0);
            let blended = weights.blend(normalized, 1.0, 1.0, 0.0);
            assert!((0.0..=1.0).contains(&normalized));
            assert!(blended <= weights.similarity + weights.category_affinity + weights.catalog_recency);
        }
    }

    #[test]
    fn test_message_templates_are_deterministic() {
        let first = compose_message("wheelchair", &[], false);
        let second = compose_message("wheelchair", &[], false);
        assert_eq!(first, second);
        assert!(first.contains("wheelchair"));
    }
}
