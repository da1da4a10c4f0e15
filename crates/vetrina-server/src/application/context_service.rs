//! Session context - interaction history and the derived preference signal
//!
//! Sessions expire lazily: an identifier idle past the inactivity window is
//! treated as brand new on the next access, so stale preferences never leak
//! into a returning client's results. All signal derivation happens here;
//! the store only holds raw history.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};

use vetrina::{
    ContextSignal, DomainError, EmbeddingProvider, PriceBand, QueryEvent, Session,
    SessionRepository,
};

use crate::services::CatalogCache;

/// Queries folded into the session preference embedding
const PREFERENCE_QUERY_COUNT: usize = 5;
/// Weighted terms kept in a signal
const MAX_WEIGHTED_TERMS: usize = 10;
/// Terms shorter than this carry no signal
const MIN_TERM_LEN: usize = 3;
/// Price band spread around the mean interacted price
const PRICE_BAND_SPREAD: f64 = 0.25;

/// Application service for session history and context signals
pub struct ContextService<S, E> {
    sessions: Arc<S>,
    embedding: Arc<E>,
    cache: Arc<CatalogCache>,
    /// Inactivity window after which a session reads as fresh
    ttl: Duration,
    /// Per-step geometric decay applied to older query terms
    decay: f32,
}

impl<S, E> ContextService<S, E>
where
    S: SessionRepository,
    E: EmbeddingProvider,
{
    pub fn new(
        sessions: Arc<S>,
        embedding: Arc<E>,
        cache: Arc<CatalogCache>,
        ttl_secs: u64,
        decay: f32,
    ) -> Self {
        Self {
            sessions,
            embedding,
            cache,
            ttl: Duration::seconds(ttl_secs as i64),
            decay,
        }
    }

    /// Fetch the session, treating expired or unknown ids as fresh
    pub async fn load(&self, session_id: &str) -> Result<Session, DomainError> {
        match self.sessions.find(session_id).await? {
            Some(session) if !session.is_expired(self.ttl, Utc::now()) => Ok(session),
            _ => Ok(Session::new(session_id.to_string())),
        }
    }

    /// Record a search: query event, result categories, refreshed
    /// preference embedding.
    pub async fn record_query(
        &self,
        session_id: &str,
        query: &str,
        returned_ids: &[i64],
    ) -> Result<(), DomainError> {
        let mut session = self.load(session_id).await?;
        session.push_event(QueryEvent {
            query: query.to_string(),
            timestamp: Utc::now(),
            returned_ids: returned_ids.to_vec(),
            selected_id: None,
        });

        let categories = self.categories_of(returned_ids).await;
        session.push_categories(categories.iter().map(String::as_str));

        self.save(&session).await
    }

    /// Record that the client picked a product out of earlier results
    pub async fn record_selection(
        &self,
        session_id: &str,
        product_id: i64,
    ) -> Result<(), DomainError> {
        let mut session = self.load(session_id).await?;
        session.mark_selected(product_id);
        session.push_viewed(product_id);

        let categories = self.categories_of(&[product_id]).await;
        session.push_categories(categories.iter().map(String::as_str));

        self.save(&session).await
    }

    /// Record a product view (recommendations endpoint)
    pub async fn record_view(
        &self,
        session_id: &str,
        product_id: i64,
    ) -> Result<(), DomainError> {
        let mut session = self.load(session_id).await?;
        session.push_viewed(product_id);

        let categories = self.categories_of(&[product_id]).await;
        session.push_categories(categories.iter().map(String::as_str));

        self.save(&session).await
    }

    /// Derive the session's preference signal. Empty for unknown, expired
    /// or history-less sessions.
    pub async fn context(&self, session_id: &str) -> Result<ContextSignal, DomainError> {
        let session = self.load(session_id).await?;
        if session.events.is_empty() && session.viewed_products.is_empty() {
            return Ok(ContextSignal::empty());
        }

        let interacted = self.interacted_products(&session).await;

        // Top categories among interacted products, ties broken by name
        let mut category_counts: HashMap<String, usize> = HashMap::new();
        for product in &interacted {
            for category in &product.categories {
                *category_counts.entry(category.clone()).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(String, usize)> = category_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let top_categories: Vec<String> =
            ranked.into_iter().take(3).map(|(name, _)| name).collect();

        // Price band: mean interacted price, spread both ways
        let price_band = if interacted.is_empty() {
            None
        } else {
            let mean: f64 =
                interacted.iter().map(|p| p.price).sum::<f64>() / interacted.len() as f64;
            Some(PriceBand {
                low: mean * (1.0 - PRICE_BAND_SPREAD),
                high: mean * (1.0 + PRICE_BAND_SPREAD),
            })
        };

        // Recency-weighted query terms: newest query weighs 1.0, each
        // older one decays geometrically.
        let mut term_weights: HashMap<String, f32> = HashMap::new();
        let mut weight = 1.0f32;
        for event in session.events.iter().rev() {
            for term in event
                .query
                .split_whitespace()
                .map(|t| t.to_lowercase())
                .filter(|t| t.len() >= MIN_TERM_LEN)
            {
                let entry = term_weights.entry(term).or_insert(0.0);
                *entry = entry.max(weight);
            }
            weight *= self.decay;
        }
        let mut weighted_terms: Vec<(String, f32)> = term_weights.into_iter().collect();
        weighted_terms.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        weighted_terms.truncate(MAX_WEIGHTED_TERMS);

        let interaction_count = session.events.len() + session.viewed_products.len();

        Ok(ContextSignal {
            top_categories,
            price_band,
            weighted_terms,
            interaction_count,
        })
    }

    /// Persist the session with a refreshed preference embedding over its
    /// recent queries. The embedding is best-effort: provider failures log
    /// a warning and the history still saves.
    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        let recent = session.recent_queries(PREFERENCE_QUERY_COUNT);
        let preference = if recent.is_empty() {
            None
        } else {
            match self.embedding.embed(&recent.join(" ")).await {
                Ok(vector) => Some(vector),
                Err(e) => {
                    tracing::warn!(
                        "Preference embedding failed for session {}: {}",
                        session.id,
                        e
                    );
                    None
                }
            }
        };
        self.sessions.save(session, preference).await
    }

    async fn categories_of(&self, product_ids: &[i64]) -> Vec<String> {
        let mut categories = Vec::new();
        for id in product_ids {
            if let Some(product) = self.cache.get(*id).await {
                for category in product.categories {
                    if !categories.contains(&category) {
                        categories.push(category);
                    }
                }
            }
        }
        categories
    }

    /// Products the session interacted with: viewed plus selected
    async fn interacted_products(&self, session: &Session) -> Vec<vetrina::Product> {
        let mut ids: Vec<i64> = session.viewed_products.clone();
        for event in &session.events {
            if let Some(selected) = event.selected_id {
                if !ids.contains(&selected) {
                    ids.push(selected);
                }
            }
        }

        let mut products = Vec::new();
        for id in ids {
            if let Some(product) = self.cache.get(id).await {
                products.push(product);
            }
        }
        products
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{product_named, BagOfWordsEmbedder, InMemoryStore};

    fn service(
        store: Arc<InMemoryStore>,
        cache: Arc<CatalogCache>,
    ) -> ContextService<InMemoryStore, BagOfWordsEmbedder> {
        ContextService::new(
            store,
            Arc::new(BagOfWordsEmbedder::new()),
            cache,
            1800,
            0.7,
        )
    }

    #[tokio::test]
    async fn test_unknown_session_yields_empty_signal() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store, Arc::new(CatalogCache::new()));

        let signal = service.context("nobody").await.unwrap();
        assert!(signal.is_empty());
    }

    #[tokio::test]
    async fn test_terms_decay_with_query_age() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store, Arc::new(CatalogCache::new()));

        service.record_query("s1", "wheelchair", &[]).await.unwrap();
        service.record_query("s1", "walker", &[]).await.unwrap();

        let signal = service.context("s1").await.unwrap();
        let weight_of = |term: &str| {
            signal
                .weighted_terms
                .iter()
                .find(|(t, _)| t == term)
                .map(|(_, w)| *w)
        };
        assert_eq!(weight_of("walker"), Some(1.0));
        let older = weight_of("wheelchair").unwrap();
        assert!(older < 1.0 && older > 0.0);
    }

    #[tokio::test]
    async fn test_top_categories_come_from_interacted_products() {
        let store = Arc::new(InMemoryStore::new());
        let cache = Arc::new(CatalogCache::new());
        cache
            .upsert(product_named(1, "Wheelchair", "", &["Mobility"]))
            .await;
        cache
            .upsert(product_named(2, "Walker", "", &["Mobility"]))
            .await;
        cache
            .upsert(product_named(3, "Hearing aid", "", &["Hearing"]))
            .await;
        let service = service(store, cache);

        service.record_view("s1", 1).await.unwrap();
        service.record_view("s1", 2).await.unwrap();
        service.record_view("s1", 3).await.unwrap();

        let signal = service.context("s1").await.unwrap();
        assert_eq!(signal.top_categories[0], "Mobility");
        assert!(signal.price_band.is_some());
    }

    #[tokio::test]
    async fn test_expired_session_reads_as_fresh() {
        let store = Arc::new(InMemoryStore::new());
        let service = ContextService::new(
            store.clone(),
            Arc::new(BagOfWordsEmbedder::new()),
            Arc::new(CatalogCache::new()),
            0,
            0.7,
        );

        service.record_query("s1", "wheelchair", &[]).await.unwrap();
        // ttl of zero expires the session immediately
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let session = service.load("s1").await.unwrap();
        assert!(session.events.is_empty());
        let signal = service.context("s1").await.unwrap();
        assert!(signal.is_empty());
    }

    #[tokio::test]
    async fn test_selection_marks_event_and_tracks_view() {
        let store = Arc::new(InMemoryStore::new());
        let cache = Arc::new(CatalogCache::new());
        cache
            .upsert(product_named(7, "Wheelchair", "", &["Mobility"]))
            .await;
        let service = service(store, cache);

        service.record_query("s1", "wheelchair", &[7, 8]).await.unwrap();
        service.record_selection("s1", 7).await.unwrap();

        let session = service.load("s1").await.unwrap();
        assert_eq!(session.events[0].selected_id, Some(7));
        assert!(session.viewed_products.contains(&7));
        assert!(session
            .interested_categories
            .iter()
            .any(|c| c == "Mobility"));
    }
}
