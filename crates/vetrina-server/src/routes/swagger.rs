//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::models::{
    ErrorBody,
    ErrorDetail,
    FiltersDto,
    HealthResponse,
    RankedProduct,
    // Search models
    SearchRequest,
    SearchResponse,
    // Sync models
    SyncRequest,
    SyncResponse,
    // Trending models
    TrendingProduct,
    TrendingResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::search::search,
        super::recommendations::recommendations,
        super::trending::trending,
        super::sync::sync_catalog,
        crate::health_check,
    ),
    components(schemas(
        SearchRequest,
        FiltersDto,
        RankedProduct,
        SearchResponse,
        SyncRequest,
        SyncResponse,
        TrendingProduct,
        TrendingResponse,
        HealthResponse,
        ErrorBody,
        ErrorDetail,
    )),
    tags(
        (name = "Search", description = "Semantic product search"),
        (name = "Recommendations", description = "Similar-product lookups"),
        (name = "Trending", description = "Interaction-based trending listing"),
        (name = "Catalog", description = "Catalog ingestion"),
        (name = "Health", description = "Service health")
    ),
    info(
        title = "Vetrina API",
        description = "Semantic product recommendation service"
    )
)]
pub struct ApiDoc;
