//! Qdrant vector store gateway
//!
//! Exclusively owns persisted state: product vectors + metadata, session
//! documents and interaction events live in three collections here. The
//! rest of the system reaches them through the repository ports only.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qdrant_client::qdrant::{
    point_id::PointIdOptions, Condition, CreateCollectionBuilder, Distance, Filter,
    GetPointsBuilder, PointId, PointStruct, Range, RecommendPointsBuilder, ScrollPointsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use uuid::Uuid;

use vetrina::{
    DomainError, InteractionEvent, InteractionRepository, Product, ProductRepository,
    SearchFilters, Session, SessionRepository, TrendingEntry,
};

const PRODUCTS: &str = "products";
const SESSIONS: &str = "sessions";
const INTERACTIONS: &str = "interactions";

/// Page size for scroll operations
const SCROLL_PAGE: u32 = 256;

/// Gateway over the Qdrant store
pub struct VectorGateway {
    client: Qdrant,
    embedding_dim: u64,
}

impl VectorGateway {
    /// Connect to Qdrant
    pub async fn new(
        url: &str,
        api_key: Option<String>,
        embedding_dim: u64,
    ) -> Result<Self, DomainError> {
        let client = if let Some(key) = api_key {
            Qdrant::from_url(url).api_key(key).build()
        } else {
            Qdrant::from_url(url).build()
        }
        .map_err(store_err)?;

        Ok(Self {
            client,
            embedding_dim,
        })
    }

    /// Create the collections if they do not exist yet.
    ///
    /// Products and sessions share the embedding dimension under cosine
    /// distance; interactions are plain documents with a unit vector.
    pub async fn ensure_collections(&self) -> Result<(), DomainError> {
        self.ensure_collection(PRODUCTS, self.embedding_dim, Distance::Cosine)
            .await?;
        self.ensure_collection(SESSIONS, self.embedding_dim, Distance::Cosine)
            .await?;
        self.ensure_collection(INTERACTIONS, 1, Distance::Dot).await?;
        Ok(())
    }

    async fn ensure_collection(
        &self,
        name: &str,
        dim: u64,
        distance: Distance,
    ) -> Result<(), DomainError> {
        if self.client.collection_exists(name).await.map_err(store_err)? {
            return Ok(());
        }
        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dim, distance)),
            )
            .await
            .map_err(store_err)?;
        tracing::info!("Created collection: {}", name);
        Ok(())
    }

    /// Store reachability for the health endpoint
    pub async fn reachable(&self) -> bool {
        self.client.health_check().await.is_ok()
    }

    fn product_filter(filters: &SearchFilters) -> Option<Filter> {
        let mut conditions = Vec::new();
        if !filters.categories.is_empty() {
            conditions.push(Condition::matches(
                "categories",
                filters.categories.clone(),
            ));
        }
        if !filters.tags.is_empty() {
            conditions.push(Condition::matches("tags", filters.tags.clone()));
        }
        if filters.price_min.is_some() || filters.price_max.is_some() {
            conditions.push(Condition::range(
                "price",
                Range {
                    gte: filters.price_min,
                    lte: filters.price_max,
                    ..Default::default()
                },
            ));
        }
        if filters.in_stock_only {
            conditions.push(Condition::matches("stock_status", "instock".to_string()));
        }
        if conditions.is_empty() {
            None
        } else {
            Some(Filter::must(conditions))
        }
    }
}

#[async_trait]
impl ProductRepository for VectorGateway {
    async fn upsert(&self, product: &Product, embedding: Vec<f32>) -> Result<(), DomainError> {
        let payload = to_payload(product)?;
        let point = PointStruct::new(product.id as u64, embedding, payload);
        self.client
            .upsert_points(UpsertPointsBuilder::new(PRODUCTS, vec![point]))
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn get(&self, product_id: i64) -> Result<Option<Product>, DomainError> {
        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(
                    PRODUCTS,
                    vec![PointId::from(product_id as u64)],
                )
                .with_payload(true),
            )
            .await
            .map_err(store_err)?;

        Ok(response
            .result
            .into_iter()
            .next()
            .and_then(|point| from_payload(&point.payload)))
    }

    async fn similarity_search(
        &self,
        query_vector: Vec<f32>,
        limit: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<(Product, f32)>, DomainError> {
        let mut request = SearchPointsBuilder::new(PRODUCTS, query_vector, limit as u64)
            .with_payload(true);
        if let Some(filter) = Self::product_filter(filters) {
            request = request.filter(filter);
        }

        let response = self.client.search_points(request).await.map_err(store_err)?;

        Ok(response
            .result
            .into_iter()
            .filter_map(|point| {
                let product = from_payload(&point.payload)?;
                Some((product, point.score))
            })
            .collect())
    }

    async fn similar_to_product(
        &self,
        product_id: i64,
        limit: usize,
    ) -> Result<Vec<(Product, f32)>, DomainError> {
        // Qdrant's recommend API uses the stored vector as the positive
        // example and excludes the example point from the results.
        let response = self
            .client
            .recommend(
                RecommendPointsBuilder::new(PRODUCTS, limit as u64)
                    .add_positive(product_id as u64)
                    .with_payload(true),
            )
            .await
            .map_err(store_err)?;

        Ok(response
            .result
            .into_iter()
            .filter_map(|point| {
                let product = from_payload(&point.payload)?;
                Some((product, point.score))
            })
            .collect())
    }

    async fn stale_ids(&self, current_model: &str) -> Result<Vec<i64>, DomainError> {
        let filter = Filter::must_not([Condition::matches(
            "embedding_model",
            current_model.to_string(),
        )]);

        let mut ids = Vec::new();
        let mut offset: Option<PointId> = None;
        loop {
            let mut request = ScrollPointsBuilder::new(PRODUCTS)
                .filter(filter.clone())
                .limit(SCROLL_PAGE)
                .with_payload(false);
            if let Some(offset) = offset.take() {
                request = request.offset(offset);
            }

            let response = self.client.scroll(request).await.map_err(store_err)?;
            ids.extend(
                response
                    .result
                    .iter()
                    .filter_map(|point| point_num(point.id.as_ref())),
            );

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }
        Ok(ids)
    }

    async fn scroll_all(&self, page_size: usize) -> Result<Vec<Product>, DomainError> {
        let mut products = Vec::new();
        let mut offset: Option<PointId> = None;
        loop {
            let mut request = ScrollPointsBuilder::new(PRODUCTS)
                .limit(page_size as u32)
                .with_payload(true);
            if let Some(offset) = offset.take() {
                request = request.offset(offset);
            }

            let response = self.client.scroll(request).await.map_err(store_err)?;
            products.extend(
                response
                    .result
                    .iter()
                    .filter_map(|point| from_payload(&point.payload)),
            );

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }
        Ok(products)
    }
}

#[async_trait]
impl SessionRepository for VectorGateway {
    async fn find(&self, session_id: &str) -> Result<Option<Session>, DomainError> {
        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(SESSIONS, vec![session_point_id(session_id)])
                    .with_payload(true),
            )
            .await
            .map_err(store_err)?;

        Ok(response
            .result
            .into_iter()
            .next()
            .and_then(|point| from_payload(&point.payload)))
    }

    async fn save(
        &self,
        session: &Session,
        preference_embedding: Option<Vec<f32>>,
    ) -> Result<(), DomainError> {
        let payload = to_payload(session)?;
        // Sessions without a preference embedding yet get a zero vector so
        // the point is storable; it will never win a similarity search.
        let vector = preference_embedding
            .unwrap_or_else(|| vec![0.0; self.embedding_dim as usize]);
        let point = PointStruct::new(session_point_id(&session.id), vector, payload);
        self.client
            .upsert_points(UpsertPointsBuilder::new(SESSIONS, vec![point]))
            .await
            .map_err(store_err)?;
        Ok(())
    }
}

#[async_trait]
impl InteractionRepository for VectorGateway {
    async fn record(&self, event: &InteractionEvent) -> Result<(), DomainError> {
        let payload = Payload::try_from(serde_json::json!({
            "product_id": event.product_id,
            "session_id": event.session_id,
            "kind": event.kind.to_string(),
            "ts": event.timestamp.timestamp(),
        }))
        .map_err(|e| DomainError::StoreUnavailable(e.to_string()))?;

        let point = PointStruct::new(Uuid::new_v4().to_string(), vec![0.0], payload);
        self.client
            .upsert_points(UpsertPointsBuilder::new(INTERACTIONS, vec![point]))
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn counts_since(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<TrendingEntry>, DomainError> {
        let filter = Filter::must([Condition::range(
            "ts",
            Range {
                gte: Some(cutoff.timestamp() as f64),
                ..Default::default()
            },
        )]);

        let mut counts: HashMap<i64, usize> = HashMap::new();
        let mut offset: Option<PointId> = None;
        loop {
            let mut request = ScrollPointsBuilder::new(INTERACTIONS)
                .filter(filter.clone())
                .limit(SCROLL_PAGE)
                .with_payload(true);
            if let Some(offset) = offset.take() {
                request = request.offset(offset);
            }

            let response = self.client.scroll(request).await.map_err(store_err)?;
            for point in &response.result {
                let product_id = serde_json::to_value(&point.payload)
                    .ok()
                    .and_then(|v| v.get("product_id").and_then(|id| id.as_i64()));
                if let Some(id) = product_id {
                    *counts.entry(id).or_default() += 1;
                }
            }

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
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

/// Session ids are opaque client strings; Qdrant point ids must be u64 or
/// UUID, so sessions map to a deterministic v5 UUID of their id.
fn session_point_id(session_id: &str) -> PointId {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, session_id.as_bytes())
        .to_string()
        .into()
}

fn to_payload<T: serde::Serialize>(value: &T) -> Result<Payload, DomainError> {
    let json = serde_json::to_value(value)
        .map_err(|e| DomainError::StoreUnavailable(e.to_string()))?;
    Payload::try_from(json).map_err(|e| DomainError::StoreUnavailable(e.to_string()))
}

fn from_payload<T: serde::de::DeserializeOwned>(
    payload: &HashMap<String, qdrant_client::qdrant::Value>,
) -> Option<T> {
    let json = serde_json::to_value(payload).ok()?;
    serde_json::from_value(json).ok()
}

fn point_num(id: Option<&PointId>) -> Option<i64> {
    match id?.point_id_options.as_ref()? {
        PointIdOptions::Num(n) => Some(*n as i64),
        PointIdOptions::Uuid(_) => None,
    }
}

fn store_err(e: qdrant_client::QdrantError) -> DomainError {
    DomainError::StoreUnavailable(e.to_string())
}
