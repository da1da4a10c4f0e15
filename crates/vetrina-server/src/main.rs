//! Vetrina - semantic product recommendation API
//!
//! Wires the adapters (Qdrant, WooCommerce, OpenAI) into the application
//! services and serves the HTTP surface.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use vetrina::ProductRepository;

mod adapters;
mod application;
mod auth;
mod config;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod testing;

use adapters::{VectorGateway, WooCatalog};
use application::{ContextService, SearchService, SyncService};
use config::AppConfig;
use models::HealthResponse;
use services::scheduler::maybe_start_scheduler;
use services::{CatalogCache, OpenAiEmbedding};

/// Type aliases for application services with concrete adapters
pub type AppContextService = ContextService<VectorGateway, OpenAiEmbedding>;
pub type AppSearchService =
    SearchService<VectorGateway, VectorGateway, VectorGateway, OpenAiEmbedding>;
pub type AppSyncService = SyncService<WooCatalog, VectorGateway, OpenAiEmbedding>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub search_service: Arc<AppSearchService>,
    pub sync_service: Arc<AppSyncService>,
    pub gateway: Arc<VectorGateway>,
    pub embedding: Arc<OpenAiEmbedding>,
    pub cache: Arc<CatalogCache>,
}

/// Service health with dependency reachability
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health status, never an error", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<HealthResponse> {
    let (store_reachable, embedding_provider_reachable) =
        tokio::join!(state.gateway.reachable(), state.embedding.reachable());

    let status = if store_reachable { "ok" } else { "degraded" };
    Json(HealthResponse {
        status: status.to_string(),
        store_reachable,
        embedding_provider_reachable,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    if let Some(api_key) = config.api_key.clone() {
        auth::init_api_key(api_key);
        tracing::info!("API key authentication enabled for /catalog/sync");
    } else {
        tracing::warn!("No VETRINA_API_KEY set - /catalog/sync is unprotected");
    }

    // Vector store gateway (products, sessions, interactions)
    let gateway = Arc::new(
        VectorGateway::new(
            &config.qdrant_url,
            config.qdrant_api_key.clone(),
            config.embedding_dim,
        )
        .await?,
    );
    gateway.ensure_collections().await?;
    tracing::info!("Vector store connected ({})", config.qdrant_url);

    let embedding = Arc::new(OpenAiEmbedding::new(
        config.openai_api_key.clone(),
        config.embedding_model.clone(),
    ));
    let catalog = Arc::new(WooCatalog::new(
        config.catalog_url.clone(),
        config.catalog_key.clone(),
        config.catalog_secret.clone(),
        config.embedding_model.clone(),
    ));

    // Hydrate the in-process catalog cache, best-effort: an unreachable
    // store at boot only delays the lexical fallback until the first sync.
    let cache = Arc::new(CatalogCache::new());
    {
        let cache = cache.clone();
        let gateway = gateway.clone();
        tokio::spawn(async move {
            match gateway.scroll_all(256).await {
                Ok(products) => {
                    let count = products.len();
                    cache.replace_all(products).await;
                    tracing::info!("Catalog cache hydrated with {} products", count);
                }
                Err(e) => tracing::warn!("Catalog cache hydration failed: {}", e),
            }
        });
    }

    let context_service = Arc::new(AppContextService::new(
        gateway.clone(),
        embedding.clone(),
        cache.clone(),
        config.session_ttl.as_secs(),
        config.query_decay,
    ));
    let search_service = Arc::new(AppSearchService::new(
        gateway.clone(),
        gateway.clone(),
        context_service,
        embedding.clone(),
        cache.clone(),
        config.weights,
        config.overfetch_factor,
        config.embed_timeout,
        config::parse_window(&config.trending_window)
            .unwrap_or_else(|| std::time::Duration::from_secs(86400)),
    ));
    let sync_service = Arc::new(AppSyncService::new(
        catalog,
        gateway.clone(),
        embedding.clone(),
        cache.clone(),
    ));

    if maybe_start_scheduler(sync_service.clone(), config.sync_interval_secs).is_some() {
        tracing::info!(
            "Sync scheduler started (every {}s)",
            config.sync_interval_secs.unwrap_or_default()
        );
    }

    let state = AppState {
        search_service,
        sync_service,
        gateway,
        embedding,
        cache,
    };

    let openapi = routes::swagger::ApiDoc::openapi();

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(routes::search::router())
        .merge(routes::recommendations::router())
        .merge(routes::trending::router())
        .merge(routes::sync::router())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Vetrina API listening on port {}", config.port);
    tracing::info!("Swagger UI: /swagger-ui");

    axum::serve(listener, router).await?;
    Ok(())
}
