//! Catalog sync - ingestion pipeline (catalog -> embeddings -> store)
//!
//! Syncs are exclusive: a second request while one runs is rejected with
//! `SyncInProgress` so two runs never interleave partial updates over the
//! same snapshot. Individual record failures are reported, never fatal. A
//! product whose embedding fails stays absent from similarity search -
//! absence, not corruption.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock, Semaphore};
use tokio::task::JoinSet;

use vetrina::{
    CatalogSource, DomainError, EmbeddingProvider, Product, ProductRepository, SyncReport,
};

use crate::services::CatalogCache;

/// Products embedded per provider call
const BATCH_SIZE: usize = 16;
/// Concurrent embedding calls in flight (provider rate-limit headroom)
const EMBED_CONCURRENCY: usize = 4;
/// Catalog page size
const PAGE_SIZE: u32 = 100;

/// Object-safe handle the scheduler and routes drive syncs through
#[async_trait]
pub trait SyncHandle: Send + Sync {
    async fn run_sync(&self, full: bool) -> Result<SyncReport, DomainError>;
}

/// Application service for catalog synchronization
pub struct SyncService<C, P, E> {
    catalog: Arc<C>,
    products: Arc<P>,
    embedding: Arc<E>,
    cache: Arc<CatalogCache>,
    /// Held for the whole run; try-locked so a second sync fails fast
    running: Mutex<()>,
    limiter: Arc<Semaphore>,
    /// Watermark of the last successful sync. In-memory: a restart falls
    /// back to a full pull.
    last_sync: RwLock<Option<DateTime<Utc>>>,
}

impl<C, P, E> SyncService<C, P, E>
where
    C: CatalogSource + 'static,
    P: ProductRepository + 'static,
    E: EmbeddingProvider + 'static,
{
    pub fn new(
        catalog: Arc<C>,
        products: Arc<P>,
        embedding: Arc<E>,
        cache: Arc<CatalogCache>,
    ) -> Self {
        Self {
            catalog,
            products,
            embedding,
            cache,
            running: Mutex::new(()),
            limiter: Arc::new(Semaphore::new(EMBED_CONCURRENCY)),
            last_sync: RwLock::new(None),
        }
    }

    /// Run a sync. `full` pulls the whole catalog; otherwise only records
    /// changed since the last successful run, plus products whose stored
    /// vector predates the current embedding model.
    pub async fn sync(&self, full: bool) -> Result<SyncReport, DomainError> {
        let _guard = self
            .running
            .try_lock()
            .map_err(|_| DomainError::SyncInProgress)?;

        let started = Instant::now();
        let started_at = Utc::now();
        let watermark = if full {
            None
        } else {
            *self.last_sync.read().await
        };

        let mut report = SyncReport {
            full: watermark.is_none(),
            ..SyncReport::default()
        };

        tracing::info!(
            "Starting catalog sync (mode: {})",
            if report.full { "full" } else { "incremental" }
        );

        // Pull the catalog, page by page
        let mut pending: Vec<Product> = Vec::new();
        let mut page = 1;
        loop {
            let fetched = self.catalog.fetch_page(page, PAGE_SIZE, watermark).await?;
            for failure in fetched.failures {
                report.record_failure(failure);
            }
            pending.extend(fetched.products);
            if !fetched.has_more {
                break;
            }
            page += 1;
        }

        // Re-embed products stored under an older embedding model
        if !report.full {
            let fetched_ids: HashSet<i64> = pending.iter().map(|p| p.id).collect();
            for id in self.products.stale_ids(self.embedding.model()).await? {
                if fetched_ids.contains(&id) {
                    continue;
                }
                match self.products.get(id).await? {
                    Some(mut product) => {
                        product.embedding_model = self.embedding.model().to_string();
                        product.synced_at = Utc::now();
                        pending.push(product);
                    }
                    // Listed as stale but gone by the time we re-read it
                    None => report.skipped += 1,
                }
            }
        }

        tracing::info!("Embedding {} products...", pending.len());

        // Fan out embedding batches under the concurrency limit
        let mut join_set = JoinSet::new();
        for chunk in pending.chunks(BATCH_SIZE) {
            let chunk: Vec<Product> = chunk.to_vec();
            let limiter = self.limiter.clone();
            let embedding = self.embedding.clone();
            let products = self.products.clone();
            let cache = self.cache.clone();

            join_set.spawn(async move {
                let _permit = limiter.acquire_owned().await;
                process_batch(chunk, embedding, products, cache).await
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => {
                    report.created += outcome.created;
                    report.updated += outcome.updated;
                    for failure in outcome.failures {
                        report.record_failure(failure);
                    }
                }
                Err(e) => report.record_failure(format!("batch task failed: {}", e)),
            }
        }

        *self.last_sync.write().await = Some(started_at);
        report.duration_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            "Catalog sync complete: {} created, {} updated, {} skipped, {} failed in {}ms",
            report.created,
            report.updated,
            report.skipped,
            report.failed,
            report.duration_ms
        );
        Ok(report)
    }
}

struct BatchOutcome {
    created: usize,
    updated: usize,
    failures: Vec<String>,
}

async fn process_batch<P, E>(
    chunk: Vec<Product>,
    embedding: Arc<E>,
    products: Arc<P>,
    cache: Arc<CatalogCache>,
) -> BatchOutcome
where
    P: ProductRepository,
    E: EmbeddingProvider,
{
    let mut outcome = BatchOutcome {
        created: 0,
        updated: 0,
        failures: Vec::new(),
    };

    let texts: Vec<String> = chunk.iter().map(|p| p.embedding_text()).collect();
    let vectors = match embedding.embed_batch(&texts).await {
        Ok(vectors) => vectors,
        Err(e) => {
            for product in &chunk {
                outcome
                    .failures
                    .push(format!("embedding failed for product {}: {}", product.id, e));
            }
            return outcome;
        }
    };

    for (product, vector) in chunk.into_iter().zip(vectors) {
        // The cache may not be hydrated yet after a restart; on a miss,
        // ask the store before classifying the write as a creation.
        let existed = match cache.get(product.id).await {
            Some(_) => true,
            None => matches!(products.get(product.id).await, Ok(Some(_))),
        };
        match products.upsert(&product, vector).await {
            Ok(()) => {
                cache.upsert(product.clone()).await;
                if existed {
                    outcome.updated += 1;
                } else {
                    outcome.created += 1;
                }
            }
            Err(e) => outcome
                .failures
                .push(format!("store upsert failed for product {}: {}", product.id, e)),
        }
    }
    outcome
}

#[async_trait]
impl<C, P, E> SyncHandle for SyncService<C, P, E>
where
    C: CatalogSource + 'static,
    P: ProductRepository + 'static,
    E: EmbeddingProvider + 'static,
{
    async fn run_sync(&self, full: bool) -> Result<SyncReport, DomainError> {
        self.sync(full).await
    }
}
